use std::io::{self, BufReader, Read};

use tracing::{debug, trace};

use super::config::{DsvConfig, NEWLINE};
use super::record::Record;
use super::source::{CharSource, StrSource, Utf8Source};
use crate::error::DsvError;

/// DSV reader decoding records from a character source.
///
/// The `DsvReader` pulls one character at a time from a [`CharSource`] and
/// runs the escape/separator state machine over it, returning one
/// [`Record`] per call.
///
/// # Features
///
/// - Skips any run of newlines before a record, so blank lines never
///   produce records
/// - Reads a final record without a trailing newline
/// - Returns the partially decoded record together with a source failure
/// - Implements `Iterator` for convenient sequential reading
/// - Reuses one field buffer for the lifetime of the reader
///
/// # Example
///
/// ```
/// use dsv_codec::codec::DsvReader;
///
/// let mut reader = DsvReader::from_text("root:x:0\n\nbin:x\\:1:1\n");
/// let first = reader.read_record().unwrap().unwrap();
/// assert_eq!(first, ["root", "x", "0"]);
/// let second = reader.read_record().unwrap().unwrap();
/// assert_eq!(second, ["bin", "x:1", "1"]);
/// assert!(reader.read_record().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct DsvReader<S> {
    /// The character source being decoded.
    source: S,
    /// Separator and escape characters.
    config: DsvConfig,
    /// Accumulation buffer for the field being decoded.
    /// Empty between calls to `read_record`.
    field: String,
    /// Current physical line (1-indexed), counting every consumed newline.
    line: u64,
    /// Set once the iterator has yielded an error.
    failed: bool,
}

impl<'a> DsvReader<StrSource<'a>> {
    /// Creates a reader over a string slice with the default configuration.
    pub fn from_text(text: &'a str) -> Self {
        Self::new(StrSource::new(text))
    }
}

impl<R: Read> DsvReader<Utf8Source<BufReader<R>>> {
    /// Creates a reader decoding UTF-8 from any byte reader, buffered.
    pub fn from_reader(reader: R) -> Self {
        Self::new(Utf8Source::from_reader(reader))
    }
}

impl<S: CharSource> DsvReader<S> {
    /// Creates a reader with the default `:` separator and `\` escape.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: DsvConfig::default(),
            field: String::new(),
            line: 1,
            failed: false,
        }
    }

    /// Creates a reader with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if the configuration is ambiguous.
    pub fn with_config(source: S, config: DsvConfig) -> Result<Self, DsvError> {
        config.validate()?;
        let mut reader = Self::new(source);
        reader.config = config;
        Ok(reader)
    }

    /// Reads one record.
    ///
    /// Returns `Ok(None)` once the source is exhausted with nothing left to
    /// read. A record that ends at the end of input (no trailing newline) is
    /// returned normally.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::Source`] if the character source fails. The error
    /// carries every field decoded so far, including the one in progress.
    pub fn read_record(&mut self) -> Result<Option<Record>, DsvError> {
        self.field.clear();
        let result = self.parse_record();
        self.field.clear();
        result
    }

    /// Reads every remaining record.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`read_record`](Self::read_record).
    /// Records read before the failure are discarded; loop over
    /// `read_record` directly to keep them.
    pub fn read_all(&mut self) -> Result<Vec<Record>, DsvError> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// The active configuration.
    pub fn config(&self) -> DsvConfig {
        self.config
    }

    /// Replaces the configuration for subsequent reads.
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

    /// The 1-based physical line the reader is positioned on.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwraps the reader, returning the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn parse_record(&mut self) -> Result<Option<Record>, DsvError> {
        let mut c = loop {
            match self.next_char() {
                Ok(Some(NEWLINE)) => continue,
                Ok(Some(c)) => break c,
                Ok(None) => return Ok(None),
                Err(source) => return Err(self.source_error(Record::new(), source)),
            }
        };

        let separator = self.config.separator();
        let escape = self.config.escape();
        let mut fields = Record::new();
        let mut is_escaping = false;

        loop {
            if is_escaping {
                self.field.push(c);
                is_escaping = false;
            } else if c == separator {
                fields.push(self.take_field());
            } else if c == escape {
                is_escaping = true;
            } else if c == NEWLINE {
                fields.push(self.take_field());
                trace!(line = self.line, fields = fields.len(), "decoded record");
                return Ok(Some(fields));
            } else {
                self.field.push(c);
            }

            c = match self.next_char() {
                Ok(Some(next)) => next,
                Ok(None) => {
                    // A dangling escape at end of input is dropped.
                    fields.push(self.take_field());
                    trace!(line = self.line, fields = fields.len(), "decoded final record");
                    return Ok(Some(fields));
                }
                Err(source) => {
                    fields.push(self.take_field());
                    return Err(self.source_error(fields, source));
                }
            };
        }
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        let c = self.source.read_char()?;
        if c == Some(NEWLINE) {
            self.line += 1;
        }
        Ok(c)
    }

    /// Closes the active field, keeping the buffer's capacity.
    fn take_field(&mut self) -> String {
        let field = self.field.as_str().to_owned();
        self.field.clear();
        field
    }

    fn source_error(&self, partial: Record, source: io::Error) -> DsvError {
        debug!(
            line = self.line,
            fields = partial.len(),
            error = %source,
            "character source failed mid-record"
        );
        DsvError::Source {
            line: self.line,
            partial,
            source,
        }
    }
}

impl<S: CharSource> Iterator for DsvReader<S> {
    type Item = Result<Record, DsvError>;

    /// Returns the next record. Yields `None` after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
