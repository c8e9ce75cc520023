//! Decoding of blackbox flight recorder logs.
//!
//! A log is a plain-text header block (the field schema and
//! calibration constants) followed by a binary stream of
//! differentially-encoded frames. [`LogReader`] runs the header phase
//! and then yields decoded [`Frame`]s one pull at a time, maintaining
//! the prediction history and recovering from corrupt stretches.

mod definition;
mod events;
mod frame;
mod header;
mod parser;
mod predictor;
mod reader;
mod stats;

pub use definition::{
    FieldDefinition, FieldEncoding, FieldPredictor, LogDefinition, Sysconfig, FIELD_ITERATION,
    FIELD_MOTOR0, FIELD_TIME,
};
pub use events::parse_event_frame;
pub use frame::{
    ErrorFrame, EventFrame, EventKind, EventValue, EventValues, Frame, FrameError, FrameKind,
    MainFrame, MainFrameType, SlowFrame, FRAME_TYPE_BYTES, FRAME_TYPE_EVENT, FRAME_TYPE_GPS,
    FRAME_TYPE_HEADER, FRAME_TYPE_INTER, FRAME_TYPE_INTRA, FRAME_TYPE_SLOW, MAX_FRAME_LENGTH,
};
pub use header::{HeaderError, HeaderReader};
pub use parser::parse_state_frame;
pub use predictor::apply_prediction;
pub use reader::{FrameReader, Frames, LogReader, ReaderOptions};
pub use stats::{FrameStats, Stats};
