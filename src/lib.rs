//! DSV Codec Library
//!
//! Streaming reader and writer for delimiter-separated values (DSV): the
//! colon-separated, backslash-escaped record format used by files such as
//! `/etc/passwd`. The [`codec`] module holds the reader, writer, record
//! model and configuration; [`error`] defines the shared error type.

pub mod codec;
pub mod error;

pub use codec::{DsvConfig, DsvReader, DsvWriter, Record};
pub use error::DsvError;
