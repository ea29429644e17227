//! Columnar record batches.
//!
//! A [`RecordBatch`] holds one column per requested field. Whether a column
//! is scalar or ragged is fixed by the file's discovered schema, not sniffed
//! per value.

use std::collections::BTreeMap;

use jetmeta_model::FieldKind;

use crate::error::{IngestError, Result};

/// One column of event data.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// One value per event.
    Scalar(Vec<f64>),
    /// A variable-length list of values per event.
    Ragged(Vec<Vec<f64>>),
}

impl Column {
    /// Number of events (rows) in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Scalar(values) => values.len(),
            Column::Ragged(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Column::Scalar(_) => FieldKind::Scalar,
            Column::Ragged(_) => FieldKind::Ragged,
        }
    }

    /// Scalar values, or `None` for a ragged column.
    pub fn as_scalar(&self) -> Option<&[f64]> {
        match self {
            Column::Scalar(values) => Some(values),
            Column::Ragged(_) => None,
        }
    }

    /// Ragged rows, or `None` for a scalar column.
    pub fn as_ragged(&self) -> Option<&[Vec<f64>]> {
        match self {
            Column::Scalar(_) => None,
            Column::Ragged(rows) => Some(rows),
        }
    }

    /// Appends another column of the same kind.
    fn extend(&mut self, other: Column) -> std::result::Result<(), (FieldKind, FieldKind)> {
        match (self, other) {
            (Column::Scalar(dst), Column::Scalar(src)) => {
                dst.extend(src);
                Ok(())
            }
            (Column::Ragged(dst), Column::Ragged(src)) => {
                dst.extend(src);
                Ok(())
            }
            (dst, src) => Err((dst.kind(), src.kind())),
        }
    }
}

/// A set of equally sized columns keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    columns: BTreeMap<String, Column>,
    rows: usize,
}

impl RecordBatch {
    /// Builds a batch from columns, checking that row counts agree.
    pub fn from_columns(columns: BTreeMap<String, Column>) -> Result<Self> {
        let mut rows = None;
        for (name, column) in &columns {
            let len = column.len();
            match rows {
                None => rows = Some(len),
                Some(expected) if expected != len => {
                    return Err(IngestError::BatchMismatch(format!(
                        "column '{name}' has {len} rows, expected {expected}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            rows: rows.unwrap_or(0),
            columns,
        })
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Concatenates batches in order. All batches must carry the same
    /// fields with the same kinds.
    pub fn concat(batches: Vec<RecordBatch>) -> Result<RecordBatch> {
        let mut iter = batches.into_iter();
        let Some(mut merged) = iter.next() else {
            return Ok(RecordBatch::default());
        };
        for batch in iter {
            if batch.columns.len() != merged.columns.len()
                || !batch.columns.keys().eq(merged.columns.keys())
            {
                return Err(IngestError::BatchMismatch(
                    "batches carry different field sets".to_string(),
                ));
            }
            for (name, column) in batch.columns {
                let dst = merged
                    .columns
                    .get_mut(&name)
                    .expect("field sets checked equal");
                dst.extend(column).map_err(|(expected, found)| {
                    IngestError::BatchMismatch(format!(
                        "column '{name}' is {found:?}, expected {expected:?}"
                    ))
                })?;
            }
            merged.rows += batch.rows;
        }
        Ok(merged)
    }
}
