//! Metadata production and the descriptor store.
//!
//! [`MetadataProducer`] wires the fixed pipeline together: file discovery →
//! variable selection → reweighting → statistics → descriptor write. The
//! descriptor document is UTF-8 JSON with sorted keys and 2-space
//! indentation so dataset-version diffs stay reviewable.

use std::collections::BTreeMap;
use std::path::Path;

use rand::rngs::StdRng;
use tracing::info;

use jetmeta_ingest::{
    Column, EventSource, FileSet, ReadRequest, RecordBatch, SampleSet, discover_files,
};
use jetmeta_model::{FieldKind, FieldSchema, MetadataConfig, MetadataDescriptor};

use crate::error::{MetaError, Result};
use crate::reweight::compute_reweight_info;
use crate::selector::select_variables;
use crate::stats::{compute_stats, plan_sample};

/// Produces one metadata descriptor per invocation.
pub struct MetadataProducer<'a> {
    config: &'a MetadataConfig,
    source: &'a dyn EventSource,
}

impl<'a> MetadataProducer<'a> {
    pub fn new(config: &'a MetadataConfig, source: &'a dyn EventSource) -> Self {
        Self { config, source }
    }

    /// Runs the full pipeline and writes the descriptor to `output_path`.
    pub fn produce(
        &self,
        input_dir: &Path,
        output_path: &Path,
        sample_set: SampleSet,
        rng: &mut StdRng,
    ) -> Result<MetadataDescriptor> {
        let descriptor = self.build(input_dir, sample_set, rng)?;
        write_descriptor(&descriptor, output_path)?;
        Ok(descriptor)
    }

    /// Runs the pipeline without persisting the result.
    pub fn build(
        &self,
        input_dir: &Path,
        sample_set: SampleSet,
        rng: &mut StdRng,
    ) -> Result<MetadataDescriptor> {
        let config = self.config;
        info!(input_dir = %input_dir.display(), "producing metadata");

        let file_set = discover_files(
            input_dir,
            &config.file_extension,
            sample_set,
            &config.tree_name,
            self.source,
        )?;
        if file_set.files.is_empty() {
            return Err(MetaError::Configuration(format!(
                "no usable '{ext}' files under {dir}",
                ext = config.file_extension,
                dir = input_dir.display()
            )));
        }

        let schema = self
            .source
            .read_schema(&file_set.files[0], &config.tree_name)?;
        let all_fields: Vec<String> = schema.iter().map(|field| field.name.clone()).collect();
        check_scalar(&schema, &config.reweight_var)?;
        for label in &config.label_fields {
            check_scalar(&schema, label)?;
        }

        let selected = select_variables(
            &all_fields,
            &config.var_groups,
            &config.var_blacklist,
            &config.label_fields,
        )?;

        let reweight_info = {
            let batch = self.read_reweight_sample(&file_set)?;
            info!(events = batch.len(), "computing reweight info");
            compute_reweight_info(
                &batch,
                &config.label_fields,
                &config.reweight_var,
                &config.reweight_bins,
            )?
        };

        let plan = plan_sample(&file_set.event_counts, config.metadata_events, rng);
        info!(
            files = plan.file_indices.len(),
            fraction = plan.fraction,
            "computing variable statistics"
        );
        let mut var_stats = BTreeMap::new();
        for var in &selected.names {
            let column = self.read_variable_sample(&file_set, &plan.file_indices, var, |count| {
                plan.row_limit(count)
            })?;
            let declared = selected.sizes.get(var).copied().flatten();
            var_stats.insert(var.clone(), compute_stats(&column, declared));
        }

        Ok(MetadataDescriptor {
            input_dir: input_dir.to_path_buf(),
            total_events: file_set.total_events,
            reweight_bins: config.reweight_bins.clone(),
            all_fields,
            tree_name: config.tree_name.clone(),
            selection: config.selection.clone(),
            input_files: file_set.files,
            event_counts: file_set.event_counts,
            var_groups: config.var_groups.clone(),
            var_blacklist: config.var_blacklist.clone(),
            label_fields: config.label_fields.clone(),
            var_fields: selected.names,
            var_sizes: selected.sizes,
            reweight_var: config.reweight_var.clone(),
            reweight_info,
            var_stats,
        })
    }

    /// Reads labels + reweight variable from every file, bounded by the
    /// reweight sample target.
    fn read_reweight_sample(&self, file_set: &FileSet) -> Result<RecordBatch> {
        let config = self.config;
        let mut fields: Vec<String> = config.label_fields.clone();
        if !fields.contains(&config.reweight_var) {
            fields.push(config.reweight_var.clone());
        }

        let fraction = if config.reweight_events > 0 && file_set.total_events > 0 {
            config.reweight_events as f64 / file_set.total_events as f64
        } else {
            1.0
        };

        let mut pieces = Vec::with_capacity(file_set.files.len());
        for (path, &count) in file_set.files.iter().zip(&file_set.event_counts) {
            let limit = if fraction < 1.0 {
                Some((fraction * count as f64) as usize)
            } else {
                None
            };
            pieces.push(self.source.read_events(
                path,
                &ReadRequest {
                    tree: &config.tree_name,
                    fields: &fields,
                    selection: config.selection.as_ref(),
                    limit,
                },
            )?);
        }
        Ok(RecordBatch::concat(pieces)?)
    }

    /// Reads one variable's column from the planned file subset.
    fn read_variable_sample(
        &self,
        file_set: &FileSet,
        file_indices: &[usize],
        var: &str,
        limit_for: impl Fn(u64) -> Option<usize>,
    ) -> Result<Column> {
        let config = self.config;
        let fields = [var.to_string()];
        let mut pieces = Vec::with_capacity(file_indices.len());
        for &index in file_indices {
            pieces.push(self.source.read_events(
                &file_set.files[index],
                &ReadRequest {
                    tree: &config.tree_name,
                    fields: &fields,
                    selection: config.selection.as_ref(),
                    limit: limit_for(file_set.event_counts[index]),
                },
            )?);
        }
        let batch = RecordBatch::concat(pieces)?;
        batch.column(var).cloned().ok_or_else(|| {
            MetaError::Configuration(format!("variable '{var}' absent from all sampled files"))
        })
    }
}

fn check_scalar(schema: &[FieldSchema], name: &str) -> Result<()> {
    let field = schema.iter().find(|field| field.name == name).ok_or_else(|| {
        MetaError::Configuration(format!(
            "field '{name}' not present in the discovered schema"
        ))
    })?;
    if field.kind != FieldKind::Scalar {
        return Err(MetaError::Configuration(format!(
            "field '{name}' must be scalar, not ragged"
        )));
    }
    Ok(())
}

/// Writes the descriptor as sorted-key, 2-space-indented JSON.
pub fn write_descriptor(descriptor: &MetadataDescriptor, path: &Path) -> Result<()> {
    // Routing through a Value sorts the keys (serde_json maps are
    // BTreeMap-backed), keeping documents diffable across runs.
    let value = serde_json::to_value(descriptor)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    std::fs::write(path, text)?;
    info!(path = %path.display(), "metadata written");
    Ok(())
}

/// Loads a descriptor document, skipping write-only fields.
pub fn load_descriptor(path: &Path) -> Result<MetadataDescriptor> {
    let text = std::fs::read_to_string(path)?;
    let descriptor = serde_json::from_str(&text)?;
    info!(path = %path.display(), "metadata loaded");
    Ok(descriptor)
}
