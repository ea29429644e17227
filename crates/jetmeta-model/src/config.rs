//! Metadata-production configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::VarGroup;
use crate::error::{ModelError, Result};
use crate::selection::Selection;

/// Configuration for one metadata-production run.
///
/// Loadable from a JSON file; every field has a default mirroring the
/// historical production settings, so a config file only needs to state
/// what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Name of the event table inside each input file.
    pub tree_name: String,
    /// Extension of candidate data files (without the dot).
    pub file_extension: String,
    /// Optional row filter applied to every read.
    pub selection: Option<Selection>,
    /// Ordered variable-group rules; earlier groups win.
    pub var_groups: Vec<VarGroup>,
    /// Fields excluded from the training-variable list even when matched.
    pub var_blacklist: Vec<String>,
    /// One-hot label indicator fields.
    pub label_fields: Vec<String>,
    /// Variable the reweighting histograms are built over.
    pub reweight_var: String,
    /// Reweighting bin edges, ascending.
    pub reweight_bins: Vec<f64>,
    /// Target number of events for the reweighting sample; 0 = use all.
    pub reweight_events: u64,
    /// Target number of events for the statistics sample; 0 = use all.
    pub metadata_events: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            tree_name: "events".to_string(),
            file_extension: "csv".to_string(),
            selection: None,
            var_groups: Vec::new(),
            var_blacklist: Vec::new(),
            label_fields: Vec::new(),
            reweight_var: "fj_pt".to_string(),
            reweight_bins: vec![
                200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 550.0, 600.0, 650.0, 700.0,
                800.0, 900.0, 1000.0, 1100.0, 1200.0, 1400.0, 1600.0, 5000.0,
            ],
            reweight_events: 100_000,
            metadata_events: 100_000,
        }
    }
}

impl MetadataConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
