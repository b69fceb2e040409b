//! Bagged ensemble of CART classification trees.
//!
//! Trees split on Gini impurity, each grown on a bootstrap sample with a
//! random subset of candidate features per node. Importance of a feature is
//! its total weighted impurity decrease, normalized per tree and averaged
//! over the ensemble.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

use super::error::ExplainError;

/// Values closer than this are not separated by a split.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Random forest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_trees: usize,
    /// Maximum tree depth (root is depth 0).
    pub max_depth: usize,
    /// A node with fewer samples becomes a leaf.
    pub min_samples_split: usize,
    /// Candidate features per split; `None` means sqrt(n_features).
    pub max_features: Option<usize>,
    /// Base seed. Tree `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::invalid("ranker.forest.n_trees must be positive"));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::invalid("ranker.forest.max_depth must be positive"));
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::invalid(
                "ranker.forest.min_samples_split must be at least 2",
            ));
        }
        if self.max_features == Some(0) {
            return Err(ConfigError::invalid("ranker.forest.max_features must be positive"));
        }
        Ok(())
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        let k = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize);
        k.clamp(1, n_features)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Gini impurity of a class histogram.
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Most frequent class; ties go to the lowest class index.
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity, lower is better.
    child_impurity: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Training inputs shared by every node of one tree.
struct TrainingSet<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
}

impl TrainingSet<'_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }
}

/// A single CART classification tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Raw weighted impurity decrease per feature.
    importances: Vec<f64>,
    n_splits: usize,
}

impl DecisionTree {
    /// Grow a tree on the (possibly repeated) row indices in `sample`.
    fn fit(
        data: &TrainingSet<'_>,
        sample: Vec<usize>,
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let n_features = data.x.first().map_or(0, |row| row.len());
        let mut tree = Self {
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
            n_splits: 0,
        };
        let total = sample.len();
        tree.grow(data, sample, 0, total, config, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &TrainingSet<'_>,
        indices: Vec<usize>,
        depth: usize,
        total: usize,
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let counts = data.class_counts(&indices);
        let impurity = gini(&counts, indices.len());
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            class: majority(&counts),
        });

        if depth >= config.max_depth
            || indices.len() < config.min_samples_split
            || impurity <= f64::EPSILON
        {
            return node_id;
        }

        let Some(split) = self.best_split(data, &indices, config, rng) else {
            return node_id;
        };

        let n = indices.len() as f64;
        self.importances[split.feature] +=
            n / total as f64 * impurity - n / total as f64 * split.child_impurity;
        self.n_splits += 1;

        let (feature, threshold) = (split.feature, split.threshold);
        let left = self.grow(data, split.left, depth + 1, total, config, rng);
        let right = self.grow(data, split.right, depth + 1, total, config, rng);
        self.nodes[node_id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };

        node_id
    }

    /// Best Gini split over a random subset of features. Features constant
    /// within the node do not count toward the subset size.
    fn best_split(
        &self,
        data: &TrainingSet<'_>,
        indices: &[usize],
        config: &ForestConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = self.importances.len();
        let wanted = config.features_per_split(n_features);

        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(rng);

        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;
        let mut visited = 0;

        for feature in order {
            if visited >= wanted {
                break;
            }

            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| data.x[a][feature].total_cmp(&data.x[b][feature]));

            let lowest = data.x[sorted[0]][feature];
            let highest = data.x[sorted[n - 1]][feature];
            if highest <= lowest + FEATURE_THRESHOLD {
                continue;
            }
            visited += 1;

            let mut left_counts = vec![0; data.n_classes];
            let mut right_counts = data.class_counts(&sorted);

            for pos in 0..n - 1 {
                let class = data.y[sorted[pos]];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let here = data.x[sorted[pos]][feature];
                let next = data.x[sorted[pos + 1]][feature];
                if next <= here + FEATURE_THRESHOLD {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                let child = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;

                if best.map_or(true, |(_, _, b)| child < b) {
                    let mut threshold = here / 2.0 + next / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = here;
                    }
                    best = Some((feature, threshold, child));
                }
            }
        }

        let (feature, threshold, child_impurity) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| data.x[i][feature] <= threshold);

        Some(BestSplit {
            feature,
            threshold,
            child_impurity,
            left,
            right,
        })
    }

    /// Predicted class for one row.
    pub fn predict(&self, row: &[f64]) -> usize {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn split_count(&self) -> usize {
        self.n_splits
    }

    /// Impurity importances normalized to sum 1 (all zero for a stump).
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.importances.len()]
        }
    }
}

/// Bootstrap-aggregated decision trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Fit on a row-major feature matrix `x` with class labels `y` in
    /// `0..n_classes`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<Self, ExplainError> {
        if x.is_empty() {
            return Err(ExplainError::fitting("empty training set"));
        }
        if x.len() != y.len() {
            return Err(ExplainError::fitting(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(ExplainError::fitting("feature rows are empty or ragged"));
        }
        if x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ExplainError::fitting("non-finite feature value"));
        }
        if let Some(bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ExplainError::fitting(format!(
                "label {} out of range for {} classes",
                bad, n_classes
            )));
        }
        config
            .validate()
            .map_err(|e| ExplainError::fitting(e.to_string()))?;

        let data = TrainingSet { x, y, n_classes };
        let n = x.len();

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(&data, sample, config, &mut rng)
            })
            .collect();

        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Mean of per-tree normalized importances over trees that split at
    /// least once, renormalized to sum 1. All zero if no tree split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_features];
        let mut contributing = 0;

        for tree in self.trees.iter().filter(|t| t.split_count() > 0) {
            for (acc, v) in sum.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
            contributing += 1;
        }

        if contributing == 0 {
            return sum;
        }

        let total: f64 = sum.iter().sum();
        if total > 0.0 {
            sum.iter().map(|v| v / total).collect()
        } else {
            sum
        }
    }

    /// Majority vote across trees; ties go to the lowest class index.
    pub fn predict(&self, row: &[f64]) -> usize {
        let mut votes = vec![0; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(row)] += 1;
        }
        majority(&votes)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
