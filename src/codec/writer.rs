use std::io::{self, BufWriter, Write};

use tracing::{debug, trace};

use super::config::{DsvConfig, NEWLINE};
use super::record::WriteStats;
use crate::error::DsvError;

/// DSV writer encoding records to a buffered byte sink.
///
/// The `DsvWriter` escapes every separator, escape and newline character
/// found inside a field and terminates each record with exactly one newline.
/// Output is UTF-8.
///
/// # Features
///
/// - Buffers writes; call [`flush`](Self::flush) (or [`write_all`](Self::write_all),
///   which flushes) to push bytes to the sink
/// - Accepts any iterable of string-like fields
/// - Remembers the kind of the last sink failure for later inspection
/// - Tracks [`WriteStats`]
///
/// Bytes handed to the sink before a failure stay written; nothing is rolled back.
///
/// # Example
///
/// ```
/// use dsv_codec::codec::DsvWriter;
///
/// let mut writer = DsvWriter::new(Vec::new());
/// writer.write_record(["path", "C:\\bin"]).unwrap();
/// let out = writer.into_inner().unwrap();
/// assert_eq!(out, b"path:C\\:\\\\bin\n");
/// ```
#[derive(Debug)]
pub struct DsvWriter<W: Write> {
    /// The buffered sink.
    writer: BufWriter<W>,
    /// Separator and escape characters.
    config: DsvConfig,
    /// Statistics for written records.
    stats: WriteStats,
    /// Kind of the most recent sink failure, until cleared.
    last_error: Option<io::ErrorKind>,
}

impl<W: Write> DsvWriter<W> {
    /// Creates a writer with the default `:` separator and `\` escape.
    pub fn new(sink: W) -> Self {
        Self::from_buf_writer(BufWriter::new(sink), DsvConfig::default())
    }

    /// Creates a writer whose buffer holds `capacity` bytes.
    pub fn with_capacity(capacity: usize, sink: W) -> Self {
        Self::from_buf_writer(BufWriter::with_capacity(capacity, sink), DsvConfig::default())
    }

    /// Creates a writer with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if the configuration is ambiguous.
    pub fn with_config(sink: W, config: DsvConfig) -> Result<Self, DsvError> {
        config.validate()?;
        Ok(Self::from_buf_writer(BufWriter::new(sink), config))
    }

    fn from_buf_writer(writer: BufWriter<W>, config: DsvConfig) -> Self {
        Self {
            writer,
            config,
            stats: WriteStats::default(),
            last_error: None,
        }
    }

    /// Writes one record followed by a newline.
    ///
    /// An empty record writes only the newline.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::Io`] as soon as the sink rejects a write. Part of
    /// the record may already have been written.
    pub fn write_record<I, S>(&mut self, record: I) -> Result<(), DsvError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.encode_record(record);
        self.track(result)
    }

    /// Writes every record in order, then flushes.
    ///
    /// # Errors
    ///
    /// Stops at the first failing record and returns its error without
    /// attempting the rest. Otherwise returns the result of the flush.
    pub fn write_all<I, R, S>(&mut self, records: I) -> Result<(), DsvError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for record in records {
            self.write_record(record)?;
        }
        self.flush()
    }

    /// Flushes buffered bytes to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::Io`] if the sink fails.
    pub fn flush(&mut self) -> Result<(), DsvError> {
        let result = self.writer.flush();
        self.track(result)
    }

    /// The kind of the most recent sink failure, if any.
    ///
    /// Stays set until [`clear_error`](Self::clear_error) so a caller can
    /// check for failures after a batch of writes without writing anything.
    pub fn last_error(&self) -> Option<io::ErrorKind> {
        self.last_error
    }

    /// Forgets the remembered sink failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Returns a reference to the current write statistics.
    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// The active configuration.
    pub fn config(&self) -> DsvConfig {
        self.config
    }

    /// Replaces the configuration for subsequent writes.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] and keeps the old configuration if
    /// the new one is ambiguous.
    pub fn set_config(&mut self, config: DsvConfig) -> Result<(), DsvError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Changes the field separator.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if it collides with the escape
    /// character or is a newline.
    pub fn set_separator(&mut self, separator: char) -> Result<(), DsvError> {
        self.config = self.config.with_separator(separator)?;
        Ok(())
    }

    /// Changes the escape character.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if it collides with the separator
    /// or is a newline.
    pub fn set_escape(&mut self, escape: char) -> Result<(), DsvError> {
        self.config = self.config.with_escape(escape)?;
        Ok(())
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Flushes and unwraps the writer, returning the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::Io`] if the final flush fails.
    pub fn into_inner(self) -> Result<W, DsvError> {
        self.writer.into_inner().map_err(|e| {
            debug!(error = %e.error(), "final flush failed");
            DsvError::Io(e.into_error())
        })
    }

    fn encode_record<I, S>(&mut self, record: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = 0u64;
        for field in record {
            if fields > 0 {
                self.put(self.config.separator())?;
            }
            self.encode_field(field.as_ref())?;
            fields += 1;
        }
        self.put(NEWLINE)?;

        self.stats.total_records += 1;
        self.stats.total_fields += fields;
        trace!(fields, "encoded record");
        Ok(())
    }

    /// Writes runs of plain text as-is and prefixes each special character
    /// with the escape.
    fn encode_field(&mut self, field: &str) -> io::Result<()> {
        let separator = self.config.separator();
        let escape = self.config.escape();

        let mut start = 0;
        for (i, c) in field.char_indices() {
            if c == escape || c == separator || c == NEWLINE {
                self.writer.write_all(field[start..i].as_bytes())?;
                self.put(escape)?;
                self.stats.escaped_chars += 1;
                // The special character opens the next run.
                start = i;
            }
        }
        self.writer.write_all(field[start..].as_bytes())
    }

    fn put(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.writer.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    fn track(&mut self, result: io::Result<()>) -> Result<(), DsvError> {
        result.map_err(|e| {
            debug!(error = %e, kind = ?e.kind(), "DSV sink failed");
            self.last_error = Some(e.kind());
            DsvError::Io(e)
        })
    }
}
