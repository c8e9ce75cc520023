//! Pull-based frame reader with stream validation and recovery.
//!
//! The reader drives the frame assembler one frame per call, keeps the
//! two-frame prediction history, applies timestamp rollover
//! correction, validates main-frame sequencing and resynchronises on
//! corruption by scanning forward to the next plausible frame type
//! byte.

use std::io::Read;

use log::{debug, warn};

use crate::blackbox::definition::LogDefinition;
use crate::blackbox::events::parse_event_frame;
use crate::blackbox::frame::{
    ErrorFrame, EventFrame, EventKind, EventValue, Frame, FrameError, MainFrame, MainFrameType,
    SlowFrame, FRAME_TYPE_BYTES, FRAME_TYPE_EVENT, FRAME_TYPE_INTER, FRAME_TYPE_INTRA,
    FRAME_TYPE_SLOW, MAX_FRAME_LENGTH,
};
use crate::blackbox::header::{HeaderError, HeaderReader};
use crate::blackbox::parser::parse_state_frame;
use crate::blackbox::stats::Stats;
use crate::stream::Decoder;

/// Largest tolerated jump of the loop iteration counter between two
/// consecutive main frames.
const MAX_ITERATION_JUMP: i64 = 5000;

/// Largest tolerated time delta between two consecutive main frames,
/// in microseconds.
const MAX_TIME_JUMP_US: i64 = 10_000_000;

/// The encoder stores timestamps modulo 2^32 microseconds.
const TIME_ROLLOVER_US: i64 = 1 << 32;

/// Reader configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReaderOptions {
    /// Emit literal field deltas: predictors (except the loop
    /// iteration increment) are suppressed and main-frame sequencing
    /// checks are skipped.
    pub raw: bool,
}

/// Reads and validates one frame at a time from an already
/// header-parsed stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    dec: Decoder<R>,
    def: LogDefinition,
    opts: ReaderOptions,
    stats: Stats,
    last_main_iteration: i64,
    last_main_time: i64,
    time_rollover_accumulator: i64,
    main_stream_is_valid: bool,
    previous_frame_1: Option<Vec<i32>>,
    previous_frame_2: Option<Vec<i32>>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(dec: Decoder<R>, def: LogDefinition, opts: ReaderOptions) -> Self {
        Self {
            dec,
            def,
            opts,
            stats: Stats::default(),
            last_main_iteration: -1,
            last_main_time: -1,
            time_rollover_accumulator: 0,
            main_stream_is_valid: false,
            previous_frame_1: None,
            previous_frame_2: None,
        }
    }

    pub fn definition(&self) -> &LogDefinition {
        &self.def
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Loop iteration of the last accepted main frame, -1 before the
    /// first one.
    pub fn last_main_iteration(&self) -> i64 {
        self.last_main_iteration
    }

    /// Rollover-corrected timestamp of the last accepted main frame,
    /// -1 before the first one.
    pub fn last_main_time(&self) -> i64 {
        self.last_main_time
    }

    /// Pull the next frame off the stream.
    ///
    /// Clean end of input surfaces as a zero-length [`ErrorFrame`]
    /// whose error is the end-of-input condition; corrupt stretches
    /// surface as [`ErrorFrame`]s carrying the discarded bytes. All
    /// other outcomes are typed frames, possibly with a per-frame
    /// error attached.
    pub fn read_next_frame(&mut self) -> Frame {
        let start = self.dec.bytes_read();

        let frame_type = match self.dec.read_byte() {
            Ok(byte) => byte,
            Err(err) => {
                // Nothing was consumed, so this is the terminal frame.
                return Frame::Error(ErrorFrame {
                    bytes: Vec::new(),
                    start,
                    end: self.dec.bytes_read(),
                    error: Some(err.into()),
                });
            }
        };

        let mut frame = self.parse_frame(frame_type, start);

        if frame.size() > MAX_FRAME_LENGTH {
            frame.set_error(FrameError::OversizedFrame { size: frame.size() });
        }

        self.validate_frame(&mut frame);
        self.stats.record_frame(&frame);
        frame
    }

    /// Dispatch on the frame type byte and assemble the frame body.
    fn parse_frame(&mut self, frame_type: u8, start: u64) -> Frame {
        match frame_type {
            FRAME_TYPE_EVENT => {
                let (event, values, error) = parse_event_frame(&mut self.dec);
                Frame::Event(EventFrame {
                    event,
                    values,
                    start,
                    end: self.dec.bytes_read(),
                    error,
                })
            }

            FRAME_TYPE_SLOW => {
                let parsed = parse_state_frame(
                    &self.def,
                    &self.def.fields_s,
                    None,
                    None,
                    &mut self.dec,
                    self.opts.raw,
                    0,
                );
                let (values, error) = split_parsed(parsed);
                Frame::Slow(SlowFrame {
                    values,
                    start,
                    end: self.dec.bytes_read(),
                    error,
                })
            }

            FRAME_TYPE_INTRA => {
                let parsed = parse_state_frame(
                    &self.def,
                    &self.def.fields_i,
                    self.previous_frame_1.as_deref(),
                    self.previous_frame_2.as_deref(),
                    &mut self.dec,
                    self.opts.raw,
                    0,
                );
                let (values, error) = split_parsed(parsed);
                Frame::Main(MainFrame {
                    frame_type: MainFrameType::Intra,
                    values,
                    time_us: 0,
                    start,
                    end: self.dec.bytes_read(),
                    error,
                })
            }

            FRAME_TYPE_INTER => {
                let skipped = self.count_intentionally_skipped_frames();
                self.stats.record_skipped_iterations(skipped);
                let parsed = parse_state_frame(
                    &self.def,
                    &self.def.fields_p,
                    self.previous_frame_1.as_deref(),
                    self.previous_frame_2.as_deref(),
                    &mut self.dec,
                    self.opts.raw,
                    skipped,
                );
                let (values, error) = split_parsed(parsed);
                Frame::Main(MainFrame {
                    frame_type: MainFrameType::Inter,
                    values,
                    time_us: 0,
                    start,
                    end: self.dec.bytes_read(),
                    error,
                })
            }

            other => {
                let bytes = self.read_bytes_to_next_frame(other);
                warn!(
                    "unsupported frame type {other:#04x} at offset {start}, skipped {} bytes",
                    bytes.len()
                );
                Frame::Error(ErrorFrame {
                    bytes,
                    start,
                    end: self.dec.bytes_read(),
                    error: Some(FrameError::UnsupportedFrameType { type_byte: other }),
                })
            }
        }
    }

    /// Check a freshly assembled frame and update reader state. Frames
    /// that fail main-stream sequencing get a desync error attached;
    /// any frame error clears the prediction history.
    fn validate_frame(&mut self, frame: &mut Frame) {
        match frame {
            Frame::Event(event) => {
                if event.error.is_some() {
                    self.invalidate_stream();
                    return;
                }
                if event.event == EventKind::LoggingResume {
                    if let (Some(EventValue::Int(iteration)), Some(EventValue::Int(time))) =
                        (event.values.get("iteration"), event.values.get("currentTime"))
                    {
                        debug!("logging resumed at iteration {iteration}");
                        self.last_main_iteration = *iteration;
                        self.last_main_time = *time + self.time_rollover_accumulator;
                    }
                }
            }

            Frame::Slow(slow) => {
                if slow.error.is_some() {
                    self.invalidate_stream();
                }
            }

            Frame::Main(_) => self.validate_main_frame(frame),

            Frame::Error(_) => self.invalidate_stream(),
        }
    }

    fn validate_main_frame(&mut self, frame: &mut Frame) {
        let Frame::Main(main) = frame else {
            return;
        };
        if main.error.is_some() || main.values.len() < 2 {
            self.invalidate_stream();
            return;
        }

        self.apply_time_rollover(main);

        match main.frame_type {
            MainFrameType::Intra => {
                // An intra frame is self-contained, so it can always
                // resynchronise the stream unless its sequencing is
                // clearly off.
                if !self.opts.raw
                    && self.last_main_iteration != -1
                    && !self.main_frame_values_valid(main)
                {
                    self.desync(main);
                } else {
                    self.main_stream_is_valid = true;
                }

                if self.main_stream_is_valid {
                    self.last_main_iteration = i64::from(main.values[0]);
                    self.last_main_time = main.time_us;
                    self.previous_frame_1 = Some(main.values.clone());
                    self.previous_frame_2 = Some(main.values.clone());
                }
            }

            MainFrameType::Inter => {
                // Inter frames are validated only against an already
                // valid stream; they can never revalidate it on their
                // own.
                if !self.opts.raw
                    && self.main_stream_is_valid
                    && !self.main_frame_values_valid(main)
                {
                    self.desync(main);
                }

                if self.main_stream_is_valid {
                    self.last_main_iteration = i64::from(main.values[0]);
                    self.last_main_time = main.time_us;
                    self.previous_frame_2 = self.previous_frame_1.take();
                    self.previous_frame_1 = Some(main.values.clone());
                }
            }
        }
    }

    fn desync(&mut self, main: &mut MainFrame) {
        warn!(
            "main frame out of sequence at offset {} (iteration {} after {})",
            main.start, main.values[0], self.last_main_iteration
        );
        main.error = Some(FrameError::Desync {
            iteration: i64::from(main.values[0]),
            time_us: main.time_us,
        });
        self.invalidate_stream();
    }

    /// Detect a 2^32us timestamp wrap against the previous main frame
    /// and store the corrected 64-bit timestamp on the frame.
    fn apply_time_rollover(&mut self, main: &mut MainFrame) {
        let raw = main.values[1] as u32;
        if self.last_main_time != -1 {
            let last = self.last_main_time as u32;
            if raw < last && raw.wrapping_sub(last) < MAX_TIME_JUMP_US as u32 {
                self.time_rollover_accumulator += TIME_ROLLOVER_US;
                debug!(
                    "timestamp rollover detected, accumulator now {}us",
                    self.time_rollover_accumulator
                );
            }
        }
        main.time_us = i64::from(raw) + self.time_rollover_accumulator;
    }

    fn main_frame_values_valid(&self, main: &MainFrame) -> bool {
        let iteration = i64::from(main.values[0]);
        iteration >= self.last_main_iteration
            && iteration < self.last_main_iteration + MAX_ITERATION_JUMP
            && main.time_us >= self.last_main_time
            && main.time_us < self.last_main_time + MAX_TIME_JUMP_US
    }

    fn invalidate_stream(&mut self) {
        self.main_stream_is_valid = false;
        self.previous_frame_1 = None;
        self.previous_frame_2 = None;
    }

    /// Number of loop iterations the encoder intentionally left out in
    /// front of the next inter frame, per the I/P interval ratio.
    fn count_intentionally_skipped_frames(&self) -> i32 {
        if self.last_main_iteration == -1 {
            return 0;
        }
        let mut count = 0;
        let mut index = self.last_main_iteration + 1;
        while !self.frame_expected(index) {
            count += 1;
            index += 1;
        }
        count
    }

    fn frame_expected(&self, index: i64) -> bool {
        let sysconfig = &self.def.sysconfig;
        let interval_i = i64::from(sysconfig.frame_interval_i.max(1));
        let num = i64::from(sysconfig.frame_interval_p_num);
        let denom = i64::from(sysconfig.frame_interval_p_denom.max(1));
        (index % interval_i + num - 1) % denom < num
    }

    /// Consume bytes until the next plausible frame type byte or the
    /// end of input, returning everything skipped (including the byte
    /// that triggered the scan).
    fn read_bytes_to_next_frame(&mut self, first: u8) -> Vec<u8> {
        let mut bytes = vec![first];
        loop {
            match self.dec.peek_byte() {
                Ok(byte) if FRAME_TYPE_BYTES.contains(&byte) => break,
                Ok(_) => match self.dec.read_byte() {
                    Ok(byte) => bytes.push(byte),
                    Err(_) => break,
                },
                Err(_) => break,
            }
        }
        bytes
    }
}

fn split_parsed(parsed: Result<Vec<i32>, FrameError>) -> (Vec<i32>, Option<FrameError>) {
    match parsed {
        Ok(values) => (values, None),
        Err(err) => (Vec::new(), Some(err)),
    }
}

/// Whole-log reader: parses the header prologue on construction, then
/// yields frames on demand.
#[derive(Debug)]
pub struct LogReader<R> {
    frames: FrameReader<R>,
}

impl<R: Read> LogReader<R> {
    /// Consume the header block of `source` and prepare for frame
    /// reading.
    pub fn new(source: R, opts: ReaderOptions) -> Result<Self, HeaderError> {
        let mut dec = Decoder::new(source);
        let def = HeaderReader::new(&mut dec).process_headers()?;
        debug!(
            "headers parsed: product '{}', {} main fields, {} slow fields",
            def.product,
            def.fields_i.len(),
            def.fields_s.len()
        );
        Ok(Self {
            frames: FrameReader::new(dec, def, opts),
        })
    }

    pub fn definition(&self) -> &LogDefinition {
        self.frames.definition()
    }

    pub fn stats(&self) -> &Stats {
        self.frames.stats()
    }

    pub fn next_frame(&mut self) -> Frame {
        self.frames.read_next_frame()
    }

    /// Iterator over the remaining frames, ending on clean end of
    /// input. A fatal read error is yielded once and ends the
    /// iteration.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames {
            reader: &mut self.frames,
            finished: false,
        }
    }
}

/// See [`LogReader::frames`].
pub struct Frames<'a, R> {
    reader: &'a mut FrameReader<R>,
    finished: bool,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        let frame = self.reader.read_next_frame();
        let clean_end =
            frame.size() == 0 && matches!(frame.error(), Some(err) if err.is_eof());
        if clean_end {
            self.finished = true;
            return None;
        }
        if matches!(frame.error(), Some(err) if err.is_fatal()) {
            self.finished = true;
        }
        Some(frame)
    }
}
