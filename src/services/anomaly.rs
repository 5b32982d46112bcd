//! Statistical anomaly scoring over transaction value sequences
//!
//! Provides a trait-based outlier scoring interface and a concrete
//! isolation-forest ensemble over 1-dimensional value sequences. Each call
//! fits a fresh model with a fixed random seed, so identical input always
//! yields an identical contribution and no state survives between requests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::services::round4;

/// Contribution when fewer points are available than a statistical fit needs
pub const SHORT_SEQUENCE_BASELINE: f64 = 0.2;

/// Minimum number of points to assess outliers reliably
pub const MIN_SEQUENCE_LEN: usize = 4;

/// Weight of the coefficient-of-variation dispersion term
const DISPERSION_WEIGHT: f64 = 0.1;

/// Guard against a zero mean in the dispersion denominator
const MEAN_EPSILON: f64 = 1e-6;

/// Subsample cap per tree, standard for isolation forests
const MAX_TREE_SAMPLE: usize = 256;

/// Outlier model that maps a value sequence to a suspicion contribution.
///
/// Implementations must return a value in [0.0, 1.0] and be deterministic
/// for identical input. The concrete numerical method is swappable without
/// touching the aggregator.
pub trait AnomalyModel: Send + Sync {
    fn score(&self, values: &[f64]) -> f64;
}

// ============================================================================
// Isolation Forest
// ============================================================================

/// 1-dimensional isolation-forest ensemble with a fixed seed.
///
/// Points that isolate in few random splits receive high anomaly scores;
/// the points ranking in the top `contamination` fraction are flagged as
/// outliers. The final contribution combines the outlier fraction with a
/// coefficient-of-variation dispersion term.
pub struct IsolationForestModel {
    pub trees: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestModel {
    fn default() -> Self {
        Self {
            trees: 100,
            contamination: 0.15,
            seed: 42,
        }
    }
}

enum TreeNode {
    Leaf {
        size: usize,
    },
    Split {
        at: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn build(sample: &[f64], depth: usize, max_depth: usize, rng: &mut StdRng) -> Self {
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if sample.len() <= 1 || depth >= max_depth || (max - min) <= f64::EPSILON {
            return TreeNode::Leaf { size: sample.len() };
        }

        let at = rng.gen_range(min..max);
        let left: Vec<f64> = sample.iter().copied().filter(|v| *v < at).collect();
        let right: Vec<f64> = sample.iter().copied().filter(|v| *v >= at).collect();
        TreeNode::Split {
            at,
            left: Box::new(TreeNode::build(&left, depth + 1, max_depth, rng)),
            right: Box::new(TreeNode::build(&right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, value: f64, depth: usize) -> f64 {
        match self {
            TreeNode::Leaf { size } => depth as f64 + average_path_length(*size),
            TreeNode::Split { at, left, right } => {
                if value < *at {
                    left.path_length(value, depth + 1)
                } else {
                    right.path_length(value, depth + 1)
                }
            }
        }
    }
}

/// Average unsuccessful-search path length c(m) of a binary search tree,
/// used both to score and to credit unresolved leaves
fn average_path_length(size: usize) -> f64 {
    if size <= 1 {
        return 0.0;
    }
    let m = size as f64;
    let harmonic = (m - 1.0).ln() + 0.577_215_664_901_532_9;
    2.0 * harmonic - 2.0 * (m - 1.0) / m
}

impl IsolationForestModel {
    /// Per-point anomaly scores `2^(-E[h]/c(m))`, each in (0, 1)
    fn anomaly_scores(&self, values: &[f64]) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_size = values.len().min(MAX_TREE_SAMPLE);
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let normalizer = average_path_length(sample_size).max(f64::EPSILON);

        let mut path_sums = vec![0.0; values.len()];
        for _ in 0..self.trees {
            let sample: Vec<f64> = if values.len() > sample_size {
                (0..sample_size)
                    .map(|_| values[rng.gen_range(0..values.len())])
                    .collect()
            } else {
                values.to_vec()
            };
            let tree = TreeNode::build(&sample, 0, max_depth, &mut rng);
            for (i, value) in values.iter().enumerate() {
                path_sums[i] += tree.path_length(*value, 0);
            }
        }

        path_sums
            .iter()
            .map(|sum| {
                let mean_path = sum / self.trees as f64;
                2.0_f64.powf(-mean_path / normalizer)
            })
            .collect()
    }

    /// Number of points flagged as outliers at the configured contamination
    fn count_outliers(&self, values: &[f64]) -> usize {
        let scores = self.anomaly_scores(values);
        let spread = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - scores.iter().copied().fold(f64::INFINITY, f64::min);
        // A degenerate sequence isolates nothing
        if spread <= 1e-12 {
            return 0;
        }

        let k = ((self.contamination * values.len() as f64).ceil() as usize).max(1);
        let mut ranked = scores.clone();
        ranked.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let threshold = ranked[k - 1];
        scores.iter().filter(|s| **s >= threshold).count()
    }
}

impl AnomalyModel for IsolationForestModel {
    fn score(&self, values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let outlier_fraction = self.count_outliers(values) as f64 / n;

        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let dispersion = variance.sqrt() / (mean + MEAN_EPSILON) * DISPERSION_WEIGHT;

        round4((outlier_fraction + dispersion).min(1.0))
    }
}

// ============================================================================
// Detector
// ============================================================================

/// Anomaly contribution scorer for a wallet's transaction value sequence
pub struct TimeSeriesAnomalyDetector {
    model: Box<dyn AnomalyModel>,
}

impl Default for TimeSeriesAnomalyDetector {
    fn default() -> Self {
        Self::new(Box::new(IsolationForestModel::default()))
    }
}

impl TimeSeriesAnomalyDetector {
    pub fn new(model: Box<dyn AnomalyModel>) -> Self {
        Self { model }
    }

    /// Anomaly contribution for a value sequence, always in [0, 1].
    /// Sequences shorter than [`MIN_SEQUENCE_LEN`] get a fixed baseline.
    pub fn score(&self, values: &[f64]) -> f64 {
        if values.len() < MIN_SEQUENCE_LEN {
            return SHORT_SEQUENCE_BASELINE;
        }
        self.model.score(values)
    }
}
