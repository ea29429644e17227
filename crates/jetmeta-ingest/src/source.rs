//! The event-source seam.
//!
//! Metadata production only ever talks to input files through this trait,
//! so the core pipeline can be exercised against any backing format (the
//! bundled [`CsvEventSource`](crate::csv_source::CsvEventSource), or a test
//! double).

use std::path::Path;

use jetmeta_model::{FieldSchema, Selection};

use crate::columnar::RecordBatch;
use crate::error::Result;

/// Parameters for one columnar read.
#[derive(Debug, Clone, Copy)]
pub struct ReadRequest<'a> {
    /// Name of the event table inside the file.
    pub tree: &'a str,
    /// Fields to materialize, one column each.
    pub fields: &'a [String],
    /// Optional row filter; rows failing it are dropped.
    pub selection: Option<&'a Selection>,
    /// Maximum number of rows to scan (applied before the selection).
    pub limit: Option<usize>,
}

/// A provider of event counts and columnar event data.
pub trait EventSource {
    /// Number of events in the named table, or `None` if the file is
    /// unreadable or does not hold that table. Callers treat `None` and
    /// `Some(0)` as "skip this file".
    fn count_events(&self, path: &Path, tree: &str) -> Option<u64>;

    /// Names and kinds of every field in the named table.
    fn read_schema(&self, path: &Path, tree: &str) -> Result<Vec<FieldSchema>>;

    /// Reads the requested fields into a columnar batch.
    fn read_events(&self, path: &Path, request: &ReadRequest<'_>) -> Result<RecordBatch>;
}
