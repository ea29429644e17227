//! Per-variable summary statistics and the sampling plan behind them.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use jetmeta_ingest::Column;
use jetmeta_model::VariableStats;

/// Oversampling factor when picking files for the statistics sample: taking
/// a few more files than strictly needed keeps per-file row fractions small.
const FILE_OVERSAMPLE: f64 = 5.0;

/// Which files to read for the statistics sample, and which fraction of
/// each file's rows to take.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePlan {
    /// Indices into the discovered file list.
    pub file_indices: Vec<usize>,
    /// Per-file row fraction in `(0, 1]`.
    pub fraction: f64,
}

impl SamplePlan {
    /// Row limit for a file with `count` events, or `None` when the whole
    /// file is read.
    pub fn row_limit(&self, count: u64) -> Option<usize> {
        if self.fraction < 1.0 {
            Some((self.fraction * count as f64) as usize)
        } else {
            None
        }
    }
}

/// Draws a bounded random subset of files approximately covering `target`
/// events. A target of 0 (or one covering everything) keeps every file in
/// full, in order.
pub fn plan_sample(event_counts: &[u64], target: u64, rng: &mut StdRng) -> SamplePlan {
    let total: u64 = event_counts.iter().sum();
    if target == 0 || total == 0 || target >= total {
        return SamplePlan {
            file_indices: (0..event_counts.len()).collect(),
            fraction: 1.0,
        };
    }

    let nfiles = FILE_OVERSAMPLE * target as f64 / total as f64 * event_counts.len() as f64;
    let nfiles = (nfiles as usize).clamp(1, event_counts.len());

    let mut indices: Vec<usize> = (0..event_counts.len()).collect();
    indices.shuffle(rng);
    indices.truncate(nfiles);

    let chosen_total: u64 = indices.iter().map(|&i| event_counts[i]).sum();
    let fraction = (target as f64 / chosen_total as f64).min(1.0);

    SamplePlan {
        file_indices: indices,
        fraction,
    }
}

/// Linear-interpolation percentile of pre-sorted values, `p` in `[0, 100]`.
/// Empty input yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// Computes summary statistics for one variable's sampled column.
///
/// Ragged columns are flattened into one scalar stream for the statistics;
/// their `size` is the declared group size when provided, else the rounded
/// 95th percentile of the per-row lengths (measured before flattening).
/// Non-finite values are replaced with 0 for the scalar statistics, so an
/// entirely non-finite variable degenerates to all-zero stats rather than
/// failing.
pub fn compute_stats(column: &Column, declared_size: Option<usize>) -> VariableStats {
    let (values, size) = match column {
        Column::Scalar(values) => (values.iter().map(|&v| scrub(v)).collect::<Vec<_>>(), None),
        Column::Ragged(rows) => {
            let size = declared_size.unwrap_or_else(|| inferred_size(rows));
            let flat = rows
                .iter()
                .flat_map(|row| row.iter().map(|&v| scrub(v)))
                .collect();
            (flat, Some(size))
        }
    };

    if values.is_empty() {
        return VariableStats {
            size,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
            median: 0.0,
            upper: 0.0,
        };
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    VariableStats {
        size,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        std: variance.sqrt(),
        median: percentile(&sorted, 50.0),
        upper: percentile(&sorted, 84.0),
    }
}

fn scrub(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn inferred_size(rows: &[Vec<f64>]) -> usize {
    let mut lengths: Vec<f64> = rows.iter().map(|row| row.len() as f64).collect();
    lengths.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    percentile(&lengths, 95.0).round() as usize
}
