//! # bbdecode - blackbox flight log decoder
//!
//! Decodes the binary flight-recorder ("blackbox") logs produced by
//! Cleanflight, Betaflight and INAV flight controllers into a
//! chronological sequence of typed frames, and optionally renders them
//! to CSV.
//!
//! A log starts with a plain-text header block that describes the
//! per-log field schema - column names, encodings, predictors and
//! calibration constants - followed by a compact binary stream of
//! differentially-encoded telemetry frames. The decoder reconstructs
//! absolute field values from the on-wire deltas, validates frame
//! sequencing, and resynchronises after corrupt stretches.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use bbdecode::blackbox::{LogReader, ReaderOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let file = File::open("flight.bfl")?;
//!     let mut reader = LogReader::new(file, ReaderOptions::default())?;
//!     println!("product: {}", reader.definition().product);
//!     for frame in reader.frames() {
//!         println!("{:?} frame, {} bytes", frame.kind(), frame.size());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module organisation
//!
//! - [`stream`] - buffered byte access and the primitive field
//!   decoders (variable-byte, zig-zag, tagged group encodings)
//! - [`blackbox`] - header parsing, predictors, frame assembly and the
//!   validating frame reader
//! - [`export`] - CSV rendering with unit conversion and flag
//!   pretty-printing

pub mod blackbox;
pub mod export;
pub mod stream;
