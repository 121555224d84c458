//! Record model and writer statistics.
//!
//! Defines [`Record`] (an ordered list of decoded fields) and [`WriteStats`]
//! for tracking what a [`DsvWriter`](super::DsvWriter) has emitted.

/// One decoded record: its fields, in order.
///
/// Fields hold the literal decoded text. Escape characters used on the wire
/// leave no trace here, so a field may contain the separator, the escape
/// character or newlines.
///
/// The reader never produces an empty record. The writer accepts one and
/// emits a lone newline, which reads back as nothing.
pub type Record = Vec<String>;

/// Statistics for records written by a [`DsvWriter`](super::DsvWriter).
///
/// # Fields
///
/// * `total_records` - Records whose terminating newline reached the buffer
/// * `total_fields` - Fields written across all records
/// * `escaped_chars` - Characters that needed an escape prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Records fully written.
    pub total_records: u64,
    /// Fields written.
    pub total_fields: u64,
    /// Characters written with an escape prefix.
    pub escaped_chars: u64,
}

impl WriteStats {
    /// Average number of fields per written record, or `0.0` before any record.
    pub fn fields_per_record(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.total_fields as f64 / self.total_records as f64
        }
    }
}
