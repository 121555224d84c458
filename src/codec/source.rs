//! Character sources feeding the DSV reader.
//!
//! The reader consumes one `char` at a time through [`CharSource`]. Clean end
//! of input is `Ok(None)`, kept distinct from I/O failures so the reader can
//! tell a finished stream from a broken one.

use std::io::{self, BufRead, BufReader, Read};
use std::str::Chars;

/// A stream of decoded characters.
pub trait CharSource {
    /// Reads the next character.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, or [`io::ErrorKind::InvalidData`]
    /// when the input is not valid UTF-8.
    fn read_char(&mut self) -> io::Result<Option<char>>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }
}

/// Characters of a borrowed string slice. Never fails.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Decodes UTF-8 from a buffered byte reader, one character per call.
///
/// Malformed sequences (bad lead bytes, bad continuation bytes, overlong
/// encodings, surrogates) and sequences cut off by the end of input are
/// reported as [`io::ErrorKind::InvalidData`]. Interrupted reads are retried.
#[derive(Debug)]
pub struct Utf8Source<R> {
    inner: R,
}

impl<R: Read> Utf8Source<BufReader<R>> {
    /// Wraps an unbuffered reader in a `BufReader` first.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> Utf8Source<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the source, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.inner.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }
}

impl<R: BufRead> CharSource for Utf8Source<R> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.read_byte()? else {
            return Ok(None);
        };

        let width = utf8_width(lead);
        match width {
            0 => {
                return Err(invalid_data(format!(
                    "invalid UTF-8 lead byte 0x{:02X}",
                    lead
                )))
            }
            1 => return Ok(Some(char::from(lead))),
            _ => {}
        }

        let mut bytes = [lead, 0, 0, 0];
        for slot in &mut bytes[1..width] {
            *slot = self
                .read_byte()?
                .ok_or_else(|| invalid_data("truncated UTF-8 sequence at end of input"))?;
        }

        let decoded = std::str::from_utf8(&bytes[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(decoded.chars().next())
    }
}

/// Sequence length announced by a UTF-8 lead byte, 0 if it cannot start one.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}
