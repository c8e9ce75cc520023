//! Buffered byte source with peek and offset accounting.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::stream::StreamError;

/// Refill granularity. The codec reads a great many single bytes, so
/// pulling from the underlying reader in large chunks is mandatory.
const BUFFER_SIZE: usize = 8 * 1024;

/// A buffered reader over any byte producer, exposing single-byte
/// reads, a non-consuming peek and the number of bytes consumed so
/// far. Offsets reported by [`bytes_read`](ByteStream::bytes_read) are
/// what frame records carry as their start/end positions.
#[derive(Debug)]
pub struct ByteStream<R> {
    inner: R,
    buf: BytesMut,
    bytes_read: u64,
    source_drained: bool,
}

impl<R: Read> ByteStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(BUFFER_SIZE),
            bytes_read: 0,
            source_drained: false,
        }
    }

    /// Number of bytes handed out so far. Monotonically increasing;
    /// peeking does not advance it.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Consume and return one byte.
    pub fn read_one(&mut self) -> Result<u8, StreamError> {
        self.fill()?;
        if self.buf.is_empty() {
            return Err(StreamError::Eof);
        }
        self.bytes_read += 1;
        Ok(self.buf.get_u8())
    }

    /// Return the next byte without consuming it.
    pub fn peek_one(&mut self) -> Result<u8, StreamError> {
        self.fill()?;
        if self.buf.is_empty() {
            return Err(StreamError::Eof);
        }
        Ok(self.buf[0])
    }

    /// Consume exactly `count` bytes. Fails with [`StreamError::Eof`]
    /// if the stream ends first.
    pub fn read_exact(&mut self, count: usize) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            self.fill()?;
            if self.buf.is_empty() {
                return Err(StreamError::Eof);
            }
            let take = (count - out.len()).min(self.buf.len());
            out.extend_from_slice(&self.buf[..take]);
            self.buf.advance(take);
            self.bytes_read += take as u64;
        }
        Ok(out)
    }

    /// True once the source has no byte left to deliver.
    pub fn is_eof(&mut self) -> Result<bool, StreamError> {
        match self.peek_one() {
            Ok(_) => Ok(false),
            Err(StreamError::Eof) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Top up the window from the underlying reader. Only refills when
    /// the window is empty, one chunk at a time.
    fn fill(&mut self) -> Result<(), StreamError> {
        if !self.buf.is_empty() || self.source_drained {
            return Ok(());
        }
        let mut chunk = [0u8; BUFFER_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.source_drained = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(StreamError::Read(err)),
            }
        }
    }
}
