//! Output sinks.
//!
//! Rendered bytes go to any [`std::io::Write`]. [`write_raw`] is the default
//! emission path when a provider does not override it, and [`Capture`] is
//! the growable in-memory destination used both for rendering to a string
//! and for capturing a provider's `put` output as partial text.

use std::io::{self, Write};

use crate::error::Result;

/// Writes `text` to `sink` verbatim.
pub fn write_raw(sink: &mut dyn Write, text: &str) -> Result<()> {
    sink.write_all(text.as_bytes())?;
    Ok(())
}

/// An in-memory growable output buffer.
///
/// Dropping a capture (or calling [`Capture::abort`]) discards whatever was
/// written to it.
#[derive(Debug, Default)]
pub struct Capture {
    buf: Vec<u8>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discards the captured output.
    pub fn abort(self) {}

    /// Finalizes the capture into a string.
    ///
    /// Fails with a system error when a provider wrote bytes that are not
    /// valid UTF-8.
    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }

    /// Finalizes the capture into its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for Capture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
