//! Decoded frame records and the per-frame error taxonomy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::stream::StreamError;

/// Frame type byte of an event frame.
pub const FRAME_TYPE_EVENT: u8 = b'E';
/// Frame type byte of a self-contained main frame.
pub const FRAME_TYPE_INTRA: u8 = b'I';
/// Frame type byte of a differentially-encoded main frame.
pub const FRAME_TYPE_INTER: u8 = b'P';
/// Frame type byte of a slow frame.
pub const FRAME_TYPE_SLOW: u8 = b'S';
/// Reserved frame type byte for GPS frames.
pub const FRAME_TYPE_GPS: u8 = b'G';
/// Header byte; must not appear mid-stream.
pub const FRAME_TYPE_HEADER: u8 = b'H';

/// Every byte that can plausibly begin a frame. Resynchronisation
/// scans forward to one of these.
pub const FRAME_TYPE_BYTES: [u8; 6] = [
    FRAME_TYPE_EVENT,
    FRAME_TYPE_INTRA,
    FRAME_TYPE_INTER,
    FRAME_TYPE_SLOW,
    FRAME_TYPE_HEADER,
    FRAME_TYPE_GPS,
];

/// Largest plausible frame. Anything bigger means the stream is
/// corrupted.
pub const MAX_FRAME_LENGTH: u64 = 256;

/// Reasons a frame (or the stream around it) is invalid.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("frame type '{}' ({:#04x}) is not supported", type_char(.type_byte), .type_byte)]
    UnsupportedFrameType { type_byte: u8 },

    #[error("Unsupported decoding '{encoding}' for field '{field}'")]
    UnsupportedEncoding { encoding: i8, field: String },

    #[error("Unsupported field predictor {predictor}")]
    UnsupportedPredictor { predictor: i8 },

    #[error("Not implemented: {what}")]
    NotImplemented { what: &'static str },

    #[error("Event type is unknown - ignored: {event}")]
    UnknownEvent { event: u8 },

    #[error("frame size {size} is bigger than the maximum allowed value {max}", max = MAX_FRAME_LENGTH)]
    OversizedFrame { size: u64 },

    #[error("frame out of sequence: iteration {iteration}, time {time_us}us")]
    Desync { iteration: i64, time_us: i64 },

    #[error("There are additional data after the end of the file")]
    DataAfterLogEnd,

    #[error("field definition for '{name}' not found")]
    UnknownField { name: String },
}

fn type_char(byte: &u8) -> char {
    char::from(*byte)
}

impl FrameError {
    /// True when this is the clean end-of-input signal rather than a
    /// corruption.
    pub fn is_eof(&self) -> bool {
        matches!(self, FrameError::Stream(err) if err.is_eof())
    }

    /// True for unrecoverable I/O failures of the byte source.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::Stream(StreamError::Read(_)))
    }
}

/// Frame classification used for dispatch and statistics.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub enum FrameKind {
    Intra,
    Inter,
    Slow,
    Event,
    Error,
}

/// Discrete event kinds carried by `E` frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventKind {
    SyncBeep,
    InflightAdjustment,
    LoggingResume,
    FlightMode,
    LogEnd,
    Unknown(u8),
}

impl EventKind {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::SyncBeep,
            13 => Self::InflightAdjustment,
            14 => Self::LoggingResume,
            30 => Self::FlightMode,
            255 => Self::LogEnd,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::SyncBeep => 0,
            Self::InflightAdjustment => 13,
            Self::LoggingResume => 14,
            Self::FlightMode => 30,
            Self::LogEnd => 255,
            Self::Unknown(raw) => raw,
        }
    }
}

/// A typed value inside an event frame payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventValue {
    Uint(u32),
    Int(i64),
    Bytes(Vec<u8>),
    Text(&'static str),
}

/// Keyed event payload, e.g. `{"name": "Sync beep", "beepTime": ...}`.
pub type EventValues = BTreeMap<&'static str, EventValue>;

/// Whether a main frame is self-contained or differential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainFrameType {
    Intra,
    Inter,
}

/// A decoded `I` or `P` frame: one signed 32-bit value per main-schema
/// column, plus the rollover-corrected 64-bit timestamp.
#[derive(Debug)]
pub struct MainFrame {
    pub frame_type: MainFrameType,
    pub values: Vec<i32>,
    /// Timestamp with the 2^32us rollover accumulator applied. The raw
    /// 32-bit value stays in `values` for prediction purposes.
    pub time_us: i64,
    pub start: u64,
    pub end: u64,
    pub error: Option<FrameError>,
}

/// A decoded `S` frame: one value per slow-schema column.
#[derive(Debug)]
pub struct SlowFrame {
    pub values: Vec<i32>,
    pub start: u64,
    pub end: u64,
    pub error: Option<FrameError>,
}

/// A decoded `E` frame.
#[derive(Debug)]
pub struct EventFrame {
    pub event: EventKind,
    pub values: EventValues,
    pub start: u64,
    pub end: u64,
    pub error: Option<FrameError>,
}

/// Raw bytes that failed to parse or were discarded while scanning
/// for the next frame boundary.
#[derive(Debug)]
pub struct ErrorFrame {
    pub bytes: Vec<u8>,
    pub start: u64,
    pub end: u64,
    pub error: Option<FrameError>,
}

/// One decoded frame. Consumers dispatch on the variant; offsets and
/// the error slot are uniform across all of them.
#[derive(Debug)]
pub enum Frame {
    Main(MainFrame),
    Slow(SlowFrame),
    Event(EventFrame),
    Error(ErrorFrame),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Main(frame) => match frame.frame_type {
                MainFrameType::Intra => FrameKind::Intra,
                MainFrameType::Inter => FrameKind::Inter,
            },
            Frame::Slow(_) => FrameKind::Slow,
            Frame::Event(_) => FrameKind::Event,
            Frame::Error(_) => FrameKind::Error,
        }
    }

    /// Byte offset of the frame type byte.
    pub fn start(&self) -> u64 {
        match self {
            Frame::Main(frame) => frame.start,
            Frame::Slow(frame) => frame.start,
            Frame::Event(frame) => frame.start,
            Frame::Error(frame) => frame.start,
        }
    }

    /// Byte offset one past the last byte of the frame.
    pub fn end(&self) -> u64 {
        match self {
            Frame::Main(frame) => frame.end,
            Frame::Slow(frame) => frame.end,
            Frame::Event(frame) => frame.end,
            Frame::Error(frame) => frame.end,
        }
    }

    pub fn size(&self) -> u64 {
        self.end() - self.start()
    }

    pub fn error(&self) -> Option<&FrameError> {
        match self {
            Frame::Main(frame) => frame.error.as_ref(),
            Frame::Slow(frame) => frame.error.as_ref(),
            Frame::Event(frame) => frame.error.as_ref(),
            Frame::Error(frame) => frame.error.as_ref(),
        }
    }

    pub(crate) fn set_error(&mut self, error: FrameError) {
        match self {
            Frame::Main(frame) => frame.error = Some(error),
            Frame::Slow(frame) => frame.error = Some(error),
            Frame::Event(frame) => frame.error = Some(error),
            Frame::Error(frame) => frame.error = Some(error),
        }
    }
}
