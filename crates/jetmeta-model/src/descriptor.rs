//! Metadata descriptor types.
//!
//! The descriptor is the single document produced by a metadata run and
//! consumed read-only by downstream training code. Fields whose JSON key
//! starts with an underscore are write-only: they are recorded for human
//! review but recomputed rather than reloaded, so `Deserialize` skips them.
//!
//! All maps are `BTreeMap` so the serialized document has a deterministic,
//! sorted key order and diffs cleanly across dataset versions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::selection::Selection;

/// Whether a field holds one value per event or a variable-length list.
///
/// Decided once at schema discovery; everything downstream branches on this
/// tag instead of sniffing value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// One scalar per event.
    Scalar,
    /// A variable-length list of scalars per event (e.g. per-particle values).
    Ragged,
}

/// Name and kind of one field discovered in a sample file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
}

/// One named group of variable-selection rules.
///
/// Patterns are anchored regexes matched against field names; `size` is an
/// optional declared vector length for ragged fields in this group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarGroup {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub size: Option<usize>,
}

/// Per-label reweighting info.
///
/// `bin_weights[i]` flattens the reweight-variable spectrum within this
/// class; `class_weight` balances classes on top of that. Zero-count bins
/// keep weight 0: they are never sampled downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelReweight {
    /// Ordered bin edges; `bin_edges.len() == raw_hist.len() + 1`.
    pub bin_edges: Vec<f64>,
    /// Raw per-bin event counts.
    pub raw_hist: Vec<f64>,
    /// Inverse-frequency weight per bin (`ref / count`, 0 for empty bins).
    pub bin_weights: Vec<f64>,
    /// Ratio of the global minimum reference count to this class's.
    pub class_weight: f64,
}

/// Summary statistics for one selected variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    /// Inferred or declared vector length; populated only for ragged fields.
    #[serde(default)]
    pub size: Option<usize>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    /// 50th percentile.
    pub median: f64,
    /// 84th percentile.
    pub upper: f64,
}

/// The persisted metadata descriptor.
///
/// Produced once per run, immutable after writing. Write-only fields (the
/// `_`-prefixed keys) default to empty on reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
    /// Directory the file list was built from. Write-only.
    #[serde(rename = "_input_dir", skip_deserializing)]
    pub input_dir: PathBuf,
    /// Sum of `event_counts`. Write-only; recomputed via [`Self::total_events`].
    #[serde(rename = "_total_events", skip_deserializing)]
    pub total_events: u64,
    /// Configured reweight bin edges. Write-only; each [`LabelReweight`]
    /// carries its own copy.
    #[serde(rename = "_reweight_bins", skip_deserializing)]
    pub reweight_bins: Vec<f64>,
    /// Every field discovered in the sample file. Write-only.
    #[serde(rename = "_all_fields", skip_deserializing)]
    pub all_fields: Vec<String>,

    /// Name of the event table inside each input file.
    pub tree_name: String,
    /// Optional row filter applied to every read.
    pub selection: Option<Selection>,
    /// Ordered input file list.
    pub input_files: Vec<PathBuf>,
    /// Per-file event counts, parallel to `input_files`.
    pub event_counts: Vec<u64>,
    /// Variable-group rules the selection was derived from.
    pub var_groups: Vec<VarGroup>,
    /// Fields removed from the selection even when matched.
    pub var_blacklist: Vec<String>,
    /// One-hot label indicator fields.
    pub label_fields: Vec<String>,
    /// Final ordered training-variable list.
    pub var_fields: Vec<String>,
    /// Declared vector size per selected variable (from its group).
    pub var_sizes: BTreeMap<String, Option<usize>>,
    /// Variable the reweighting histograms are built over.
    pub reweight_var: String,
    /// Per-label reweighting info.
    pub reweight_info: BTreeMap<String, LabelReweight>,
    /// Per-variable summary statistics.
    pub var_stats: BTreeMap<String, VariableStats>,
}

impl MetadataDescriptor {
    /// Total event count derived from the per-file counts.
    pub fn total_events(&self) -> u64 {
        self.event_counts.iter().sum()
    }
}
