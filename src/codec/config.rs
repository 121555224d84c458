//! Separator and escape configuration shared by the reader and writer.
//!
//! A configuration can be built in code, loaded from JSON, or mutated on a
//! live reader/writer through its setters. Every path runs the same
//! validation, so a [`DsvConfig`] value is always usable.
//!
//! # JSON Format
//!
//! ```json
//! { "separator": ":", "escape": "\\" }
//! ```
//!
//! Missing keys take the defaults.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::DsvError;

/// Default field separator.
pub const DEFAULT_SEPARATOR: char = ':';

/// Default escape prefix.
pub const DEFAULT_ESCAPE: char = '\\';

/// The record terminator. Not configurable.
pub const NEWLINE: char = '\n';

/// Raw shape of a configuration before validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    separator: char,
    escape: char,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            escape: DEFAULT_ESCAPE,
        }
    }
}

/// Field separator and escape character for one reader or writer.
///
/// Configurations where the separator equals the escape character, or where
/// either one is the newline, are rejected: the escaping rules cannot tell
/// those roles apart and a round trip would silently corrupt data.
///
/// # Example
///
/// ```
/// use dsv_codec::codec::DsvConfig;
///
/// let config = DsvConfig::new('|', '%').unwrap();
/// assert_eq!(config.separator(), '|');
/// assert_eq!(config.escape(), '%');
///
/// assert!(DsvConfig::new('\n', '\\').is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct DsvConfig {
    separator: char,
    escape: char,
}

impl Default for DsvConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            escape: DEFAULT_ESCAPE,
        }
    }
}

impl TryFrom<RawConfig> for DsvConfig {
    type Error = DsvError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(raw.separator, raw.escape)
    }
}

impl DsvConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if the pair is ambiguous
    /// (see [`DsvConfig::validate`]).
    pub fn new(separator: char, escape: char) -> Result<Self, DsvError> {
        let config = Self { separator, escape };
        config.validate()?;
        Ok(config)
    }

    /// Checks that separator, escape and newline are three distinct characters.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] describing the first collision found.
    pub fn validate(&self) -> Result<(), DsvError> {
        let problem = if self.separator == NEWLINE {
            Some("separator cannot be the newline character".to_string())
        } else if self.escape == NEWLINE {
            Some("escape cannot be the newline character".to_string())
        } else if self.separator == self.escape {
            Some(format!(
                "separator and escape must differ (both are {:?})",
                self.separator
            ))
        } else {
            None
        };

        match problem {
            Some(message) => {
                tracing::debug!(
                    separator = ?self.separator,
                    escape = ?self.escape,
                    "rejected DSV configuration"
                );
                Err(DsvError::InvalidConfig(message))
            }
            None => Ok(()),
        }
    }

    /// The field separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// The escape prefix.
    pub fn escape(&self) -> char {
        self.escape
    }

    /// Returns a copy with a different separator, validated.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if the new pair is ambiguous.
    pub fn with_separator(self, separator: char) -> Result<Self, DsvError> {
        Self::new(separator, self.escape)
    }

    /// Returns a copy with a different escape character, validated.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::InvalidConfig`] if the new pair is ambiguous.
    pub fn with_escape(self, escape: char) -> Result<Self, DsvError> {
        Self::new(self.separator, escape)
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`DsvError::Config`] for malformed JSON or an invalid pair
    /// (serde surfaces validation failures as data errors).
    pub fn from_json_str(json: &str) -> Result<Self, DsvError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`DsvError::Io`] if the file cannot be opened
    /// - [`DsvError::Config`] if the content is not a valid configuration
    pub fn from_json_file(path: &Path) -> Result<Self, DsvError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
