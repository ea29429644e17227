//! Per-class reweighting info.
//!
//! Goal: (1) flatten the reweight-variable spectrum across the configured
//! bins within each class, (2) balance class frequencies on top of that.

use std::collections::BTreeMap;

use tracing::debug;

use jetmeta_ingest::RecordBatch;
use jetmeta_model::LabelReweight;

use crate::error::{MetaError, Result};

/// Minimum events required in each of the two highest bins; below this the
/// high-value tail cannot be reweighted reliably.
const MIN_TAIL_EVENTS: f64 = 10.0;

/// Histograms `values` over `edges`, clipping every value into
/// `[edges[0], edges[last]]` so out-of-range events land in the edge bins.
/// Non-finite values are ignored.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let bins = edges.len().saturating_sub(1);
    let mut hist = vec![0.0; bins];
    if bins == 0 {
        return hist;
    }
    let (lo, hi) = (edges[0], edges[edges.len() - 1]);
    for &value in values {
        if !value.is_finite() {
            continue;
        }
        let clipped = value.clamp(lo, hi);
        // Index of the last edge <= value; the final bin includes its right
        // edge.
        let index = edges.partition_point(|edge| *edge <= clipped);
        hist[index.saturating_sub(1).min(bins - 1)] += 1.0;
    }
    hist
}

/// Computes reweighting info for every label over one sampled batch.
///
/// Labels are mutually exclusive one-hot indicators: a row belongs to a
/// label when its indicator is nonzero. Zero-count bins keep weight 0 and
/// are never sampled downstream.
pub fn compute_reweight_info(
    batch: &RecordBatch,
    labels: &[String],
    reweight_var: &str,
    edges: &[f64],
) -> Result<BTreeMap<String, LabelReweight>> {
    if edges.len() < 3 {
        return Err(MetaError::Configuration(
            "reweighting requires at least two bins".to_string(),
        ));
    }
    if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(MetaError::Configuration(
            "reweight bin edges must be strictly increasing".to_string(),
        ));
    }

    let values = scalar_column(batch, reweight_var)?;
    let mut result = BTreeMap::new();
    let mut reference_counts: BTreeMap<&str, f64> = BTreeMap::new();

    for label in labels {
        let indicator = scalar_column(batch, label)?;
        let in_class: Vec<f64> = indicator
            .iter()
            .zip(values)
            .filter(|(flag, _)| **flag != 0.0)
            .map(|(_, value)| *value)
            .collect();

        let hist = histogram(&in_class, edges);
        debug!(label = %label, hist = ?hist, "reweight histogram");

        let tail = &hist[hist.len() - 2..];
        if tail.iter().copied().fold(f64::INFINITY, f64::min) < MIN_TAIL_EVENTS {
            return Err(MetaError::InsufficientData {
                label: label.clone(),
                hist,
            });
        }

        let reference = hist
            .iter()
            .copied()
            .filter(|count| *count > 0.0)
            .fold(f64::INFINITY, f64::min);
        reference_counts.insert(label, reference);

        let bin_weights = hist
            .iter()
            .map(|&count| if count > 0.0 { reference / count } else { 0.0 })
            .collect();

        result.insert(
            label.clone(),
            LabelReweight {
                bin_edges: edges.to_vec(),
                raw_hist: hist,
                bin_weights,
                class_weight: 1.0,
            },
        );
    }

    let min_reference = reference_counts
        .values()
        .copied()
        .fold(f64::INFINITY, f64::min);
    for (label, info) in &mut result {
        info.class_weight = min_reference / reference_counts[label.as_str()];
    }

    Ok(result)
}

fn scalar_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a [f64]> {
    batch
        .column(name)
        .ok_or_else(|| {
            MetaError::Configuration(format!("field '{name}' missing from the sampled batch"))
        })?
        .as_scalar()
        .ok_or_else(|| {
            MetaError::Configuration(format!("field '{name}' must be scalar, not ragged"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetmeta_ingest::Column;
    use std::collections::BTreeMap as Map;

    fn batch(columns: Vec<(&str, Vec<f64>)>) -> RecordBatch {
        let columns: Map<String, Column> = columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), Column::Scalar(values)))
            .collect();
        RecordBatch::from_columns(columns).expect("batch")
    }

    /// Spreads `counts[i]` events across bin `i` of `edges`.
    fn events_for(counts: &[usize], edges: &[f64]) -> Vec<f64> {
        let mut values = Vec::new();
        for (i, &count) in counts.iter().enumerate() {
            let center = (edges[i] + edges[i + 1]) / 2.0;
            values.extend(std::iter::repeat_n(center, count));
        }
        values
    }

    #[test]
    fn histogram_clips_out_of_range_values() {
        let edges = [0.0, 1.0, 2.0];
        let hist = histogram(&[-5.0, 0.5, 1.5, 2.0, 99.0], &edges);
        assert_eq!(hist, vec![2.0, 3.0]);
    }

    #[test]
    fn histogram_ignores_non_finite_values() {
        let edges = [0.0, 1.0, 2.0];
        let hist = histogram(&[f64::NAN, f64::NEG_INFINITY, 0.5], &edges);
        assert_eq!(hist, vec![1.0, 0.0]);
    }

    #[test]
    fn weights_flatten_the_spectrum() {
        let edges = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        // Counts [0, 20, 50, 100]: both tail bins clear the 10-event floor
        // and the reference is the smallest non-empty bin (20).
        let values = events_for(&[0, 20, 50, 100], &edges);
        let ones = vec![1.0; values.len()];
        let batch = batch(vec![("fj_pt", values), ("label_b", ones)]);

        let info = compute_reweight_info(&batch, &["label_b".to_string()], "fj_pt", &edges)
            .expect("reweight");
        let label = &info["label_b"];
        assert_eq!(label.raw_hist, vec![0.0, 20.0, 50.0, 100.0]);
        assert_eq!(label.bin_weights, vec![0.0, 1.0, 0.4, 0.2]);
        assert_eq!(label.class_weight, 1.0);
        assert_eq!(label.bin_edges.len(), label.raw_hist.len() + 1);
    }

    #[test]
    fn class_weights_balance_reference_counts() {
        let edges = vec![0.0, 1.0, 2.0];
        // label_a: ref 20; label_b: ref 50 -> class weights 1.0 and 0.4.
        let a_values = events_for(&[20, 40], &edges);
        let b_values = events_for(&[50, 90], &edges);

        let mut values = a_values.clone();
        values.extend(b_values.clone());
        let mut label_a = vec![1.0; a_values.len()];
        label_a.extend(vec![0.0; b_values.len()]);
        let mut label_b = vec![0.0; a_values.len()];
        label_b.extend(vec![1.0; b_values.len()]);

        let batch = batch(vec![
            ("fj_pt", values),
            ("label_a", label_a),
            ("label_b", label_b),
        ]);
        let info = compute_reweight_info(
            &batch,
            &["label_a".to_string(), "label_b".to_string()],
            "fj_pt",
            &edges,
        )
        .expect("reweight");

        assert_eq!(info["label_a"].class_weight, 1.0);
        assert_eq!(info["label_b"].class_weight, 0.4);
    }

    #[test]
    fn non_monotonic_edges_are_rejected() {
        let edges = vec![0.0, 2.0, 1.0, 3.0];
        let batch = batch(vec![("fj_pt", vec![0.5]), ("label_b", vec![1.0])]);

        let err = compute_reweight_info(&batch, &["label_b".to_string()], "fj_pt", &edges)
            .expect_err("unsorted edges");
        assert!(matches!(err, MetaError::Configuration(_)));
    }

    #[test]
    fn sparse_tail_raises_insufficient_data() {
        let edges = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let values = events_for(&[100, 100, 5, 3], &edges);
        let ones = vec![1.0; values.len()];
        let batch = batch(vec![("fj_pt", values), ("label_b", ones)]);

        let err = compute_reweight_info(&batch, &["label_b".to_string()], "fj_pt", &edges)
            .expect_err("sparse tail");
        match err {
            MetaError::InsufficientData { label, hist } => {
                assert_eq!(label, "label_b");
                assert_eq!(hist, vec![100.0, 100.0, 5.0, 3.0]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_class_raises_insufficient_data() {
        let edges = vec![0.0, 1.0, 2.0];
        let batch = batch(vec![
            ("fj_pt", vec![0.5, 1.5]),
            ("label_b", vec![0.0, 0.0]),
        ]);
        let err = compute_reweight_info(&batch, &["label_b".to_string()], "fj_pt", &edges)
            .expect_err("empty class");
        assert!(matches!(err, MetaError::InsufficientData { .. }));
    }
}
