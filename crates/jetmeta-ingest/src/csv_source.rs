//! CSV-backed event source.
//!
//! File layout:
//! - an optional `# tree: <name>` banner line naming the table; when present
//!   it must match the requested tree name,
//! - a header row naming the fields,
//! - one row per event.
//!
//! Ragged cells are bracketed, `;`-separated lists (`[1.5;2.0]`, empty list
//! `[]`); plain cells are scalars. A field's kind is fixed by the first data
//! row; later rows must conform. An empty scalar cell reads as NaN so that
//! downstream non-finite scrubbing applies.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use jetmeta_model::{FieldKind, FieldSchema};

use crate::columnar::{Column, RecordBatch};
use crate::error::{IngestError, Result};
use crate::source::{EventSource, ReadRequest};

const TREE_BANNER: &str = "# tree:";

/// Event source reading the CSV table layout described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEventSource;

impl CsvEventSource {
    pub fn new() -> Self {
        Self
    }
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RawTable {
    fn field_index(&self, path: &Path, field: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == field)
            .ok_or_else(|| IngestError::MissingField {
                path: path.to_path_buf(),
                field: field.to_string(),
            })
    }

    /// Kind of the column at `index`, taken from the first data row.
    /// Files without data rows report every field as scalar.
    fn kind_of(&self, index: usize) -> FieldKind {
        match self.rows.first().and_then(|row| row.get(index)) {
            Some(cell) if cell.starts_with('[') => FieldKind::Ragged,
            _ => FieldKind::Scalar,
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn read_table(path: &Path, tree: &str) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    // Validate the table banner when present; other comment lines are
    // skipped by the reader below.
    if let Some(first_line) = text.lines().next()
        && let Some(rest) = first_line.strip_prefix(TREE_BANNER)
    {
        let found = rest.trim();
        if found != tree {
            return Err(IngestError::TreeMismatch {
                path: path.to_path_buf(),
                expected: tree.to_string(),
                found: found.to_string(),
            });
        }
    }

    let mut reader = ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record);
    }

    Ok(RawTable { headers, rows })
}

fn parse_scalar(path: &Path, field: &str, cell: &str) -> Result<f64> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| IngestError::ParseValue {
        path: path.to_path_buf(),
        field: field.to_string(),
        value: cell.to_string(),
    })
}

fn parse_ragged(path: &Path, field: &str, cell: &str) -> Result<Vec<f64>> {
    let inner = cell
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| IngestError::ParseValue {
            path: path.to_path_buf(),
            field: field.to_string(),
            value: cell.to_string(),
        })?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(';')
        .map(|item| parse_scalar(path, field, item.trim()))
        .collect()
}

impl EventSource for CsvEventSource {
    fn count_events(&self, path: &Path, tree: &str) -> Option<u64> {
        let table = read_table(path, tree).ok()?;
        Some(table.rows.len() as u64)
    }

    fn read_schema(&self, path: &Path, tree: &str) -> Result<Vec<FieldSchema>> {
        let table = read_table(path, tree)?;
        Ok(table
            .headers
            .iter()
            .enumerate()
            .map(|(index, name)| FieldSchema {
                name: name.clone(),
                kind: table.kind_of(index),
            })
            .collect())
    }

    fn read_events(&self, path: &Path, request: &ReadRequest<'_>) -> Result<RecordBatch> {
        let table = read_table(path, request.tree)?;

        let selection = match request.selection {
            Some(sel) => {
                let index = table.field_index(path, &sel.field)?;
                if table.kind_of(index) != FieldKind::Scalar {
                    return Err(IngestError::KindMismatch {
                        path: path.to_path_buf(),
                        field: sel.field.clone(),
                        expected: FieldKind::Scalar,
                        found: FieldKind::Ragged,
                    });
                }
                Some((sel, index))
            }
            None => None,
        };

        struct FieldPlan<'a> {
            name: &'a str,
            index: usize,
            kind: FieldKind,
        }

        let mut plans = Vec::with_capacity(request.fields.len());
        for field in request.fields {
            let index = table.field_index(path, field)?;
            plans.push(FieldPlan {
                name: field,
                index,
                kind: table.kind_of(index),
            });
        }

        let mut columns: BTreeMap<String, Column> = plans
            .iter()
            .map(|plan| {
                let column = match plan.kind {
                    FieldKind::Scalar => Column::Scalar(Vec::new()),
                    FieldKind::Ragged => Column::Ragged(Vec::new()),
                };
                (plan.name.to_string(), column)
            })
            .collect();

        let scan = match request.limit {
            Some(limit) => limit.min(table.rows.len()),
            None => table.rows.len(),
        };

        for row in &table.rows[..scan] {
            if let Some((sel, index)) = selection {
                let cell = row.get(index).unwrap_or("");
                if !sel.matches(parse_scalar(path, &sel.field, cell)?) {
                    continue;
                }
            }
            for plan in &plans {
                let cell = row.get(plan.index).unwrap_or("");
                match columns.get_mut(plan.name).expect("column prebuilt") {
                    Column::Scalar(values) => {
                        if cell.starts_with('[') {
                            return Err(IngestError::KindMismatch {
                                path: path.to_path_buf(),
                                field: plan.name.to_string(),
                                expected: FieldKind::Scalar,
                                found: FieldKind::Ragged,
                            });
                        }
                        values.push(parse_scalar(path, plan.name, cell)?);
                    }
                    Column::Ragged(rows) => {
                        rows.push(parse_ragged(path, plan.name, cell)?);
                    }
                }
            }
        }

        RecordBatch::from_columns(columns)
    }
}
