//! DSV codec module
//!
//! Reads and writes delimiter-separated values: records separated by one or
//! more newlines, fields separated by a single separator character, and a
//! single escape character that makes the next character literal.
//!
//! # Wire Format
//!
//! ```text
//! root:x:0:0:root:/root:/bin/sh
//! note:a field with a \: colon and a \
//! line break
//! ```
//!
//! The second record has two fields, `note` and
//! `"a field with a : colon and a \nline break"`.
//!
//! # Example
//!
//! ```
//! use dsv_codec::codec::{decode_str, encode_to_string};
//!
//! let records = vec![vec!["a:b".to_string(), "c".to_string()]];
//! let text = encode_to_string(&records).unwrap();
//! assert_eq!(text, "a\\:b:c\n");
//! assert_eq!(decode_str(&text).unwrap(), records);
//! ```

pub mod config;
pub mod reader;
pub mod record;
pub mod source;
pub mod writer;

pub use config::{DsvConfig, DEFAULT_ESCAPE, DEFAULT_SEPARATOR};
pub use reader::DsvReader;
pub use record::{Record, WriteStats};
pub use source::{CharSource, StrSource, Utf8Source};
pub use writer::DsvWriter;

use crate::error::DsvError;

/// Decodes every record in `text` with the default configuration.
///
/// # Errors
///
/// Never fails for string input; the `Result` mirrors [`DsvReader::read_all`].
pub fn decode_str(text: &str) -> Result<Vec<Record>, DsvError> {
    DsvReader::from_text(text).read_all()
}

/// Encodes records with the default configuration into a new string.
///
/// # Errors
///
/// Never fails for in-memory output; the `Result` mirrors [`DsvWriter::write_all`].
pub fn encode_to_string<I, R, S>(records: I) -> Result<String, DsvError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = DsvWriter::new(Vec::new());
    writer.write_all(records)?;
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes)
        .map_err(|e| DsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
