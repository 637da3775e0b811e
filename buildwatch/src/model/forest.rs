//! Isolation forest fit and scoring.
//!
//! Follows the standard formulation: each tree is grown on a subsample of
//! rows with uniformly random feature/threshold splits, the path length a
//! row travels before isolating is averaged across trees and normalized by
//! the expected path length for the subsample size, and the anomaly measure
//! is `2^(-E[h]/c(psi))`. Scores are negated so that lower means more
//! anomalous, and the contamination quantile of the training scores becomes
//! the outlier threshold.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{ForestConfig, ModelError};
use crate::record::{FeatureVector, FEATURE_COUNT};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// A fitted isolation forest.
///
/// Lower [`score_samples`] means more anomalous; a negative
/// [`decision_function`] marks the row as an outlier.
///
/// [`score_samples`]: IsolationForest::score_samples
/// [`decision_function`]: IsolationForest::decision_function
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    subsample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fits a forest on the given rows.
    pub fn fit(config: &ForestConfig, rows: &[FeatureVector]) -> Result<Self, ModelError> {
        config.validate()?;
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let subsample_size = config.max_samples.min(rows.len());
        let height_limit = (subsample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            let indices = sample_indices(&mut rng, rows.len(), subsample_size);
            trees.push(IsolationTree::fit(rows, &indices, height_limit, &mut rng));
        }

        let mut forest = Self {
            trees,
            subsample_size,
            offset: 0.0,
        };

        let training_scores: Vec<f64> = rows.iter().map(|row| forest.score_samples(row)).collect();
        forest.offset = percentile(&training_scores, 100.0 * config.contamination);

        Ok(forest)
    }

    /// Negated anomaly measure; lower means more anomalous.
    pub fn score_samples(&self, features: &FeatureVector) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(features))
            .sum();
        let mean_path = total / self.trees.len() as f64;

        // c(1) is zero; clamp so a degenerate single-row fit cannot divide
        // by zero.
        let expected = average_path_length(self.subsample_size).max(1e-12);

        -((-mean_path / expected).exp2())
    }

    /// Signed margin over the trained threshold; negative marks an outlier.
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        self.score_samples(features) - self.offset
    }

    /// Whether the model flags the row as an outlier.
    pub fn is_outlier(&self, features: &FeatureVector) -> bool {
        self.decision_function(features) < 0.0
    }

    /// The trained threshold on [`score_samples`](Self::score_samples).
    pub fn threshold(&self) -> f64 {
        self.offset
    }

    /// Number of trees in the ensemble.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Rows subsampled per tree during the fit.
    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }
}

/// One random binary tree, stored as a flat arena.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

impl IsolationTree {
    fn fit(
        rows: &[FeatureVector],
        indices: &[usize],
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes = Vec::new();
        grow(rows, indices, 0, height_limit, rng, &mut nodes);
        Self { nodes }
    }

    /// Depth reached by the row plus the expected remainder at the leaf.
    fn path_length(&self, features: &FeatureVector) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { size } => return depth + average_path_length(*size),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Grows one node and returns its arena index.
fn grow(
    rows: &[FeatureVector],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    if depth >= height_limit || indices.len() <= 1 {
        nodes.push(TreeNode::Leaf {
            size: indices.len(),
        });
        return nodes.len() - 1;
    }

    // Only features that still vary across these rows can split them.
    let candidates: Vec<(usize, f64, f64)> = (0..FEATURE_COUNT)
        .filter_map(|feature| {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for &index in indices {
                let value = rows[index][feature];
                lo = lo.min(value);
                hi = hi.max(value);
            }
            (hi > lo).then_some((feature, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        nodes.push(TreeNode::Leaf {
            size: indices.len(),
        });
        return nodes.len() - 1;
    }

    let (feature, lo, hi) = candidates[rng.random_range(0..candidates.len())];
    let threshold = lo + rng.random::<f64>() * (hi - lo);

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&index| rows[index][feature] < threshold);

    if left_rows.is_empty() || right_rows.is_empty() {
        nodes.push(TreeNode::Leaf {
            size: indices.len(),
        });
        return nodes.len() - 1;
    }

    let node_index = nodes.len();
    nodes.push(TreeNode::Leaf { size: 0 });
    let left = grow(rows, &left_rows, depth + 1, height_limit, rng, nodes);
    let right = grow(rows, &right_rows, depth + 1, height_limit, rng, nodes);
    nodes[node_index] = TreeNode::Split {
        feature,
        threshold,
        left,
        right,
    };
    node_index
}

/// Draws `amount` distinct row indices, or all of them when the training
/// set is no larger than the subsample.
fn sample_indices(rng: &mut StdRng, n: usize, amount: usize) -> Vec<usize> {
    if amount >= n {
        (0..n).collect()
    } else {
        rand::seq::index::sample(rng, n, amount).into_vec()
    }
}

/// Average unsuccessful-search path length of a binary search tree with
/// `n` nodes, the standard normalizer for isolation forests.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolation percentile, `pct` in [0, 100].
fn percentile(values: &[f64], pct: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = (pct / 100.0).clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}
