//! Byte-level access to a blackbox log stream.
//!
//! The log body is a dense sequence of variable-byte and tagged
//! encodings that are read one or two bytes at a time, so everything
//! goes through a buffered [`ByteStream`] with peek support and exact
//! offset accounting. [`Decoder`] layers the primitive field decoders
//! on top of it.

mod decoder;
mod sign_extend;
mod source;

pub use decoder::Decoder;
pub use sign_extend::{
    sign_extend_14bit, sign_extend_24bit, sign_extend_2bit, sign_extend_4bit, sign_extend_6bit,
};
pub use source::ByteStream;

/// Errors produced by the byte layer.
///
/// Running out of bytes is an expected condition for the caller (a log
/// simply ends) and is kept apart from real I/O failures, which are
/// not recoverable.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("unexpected end of input")]
    Eof,

    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
}

impl StreamError {
    /// True for the clean end-of-input condition.
    pub fn is_eof(&self) -> bool {
        matches!(self, StreamError::Eof)
    }
}
