// CART decision tree classifier (Gini impurity)
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TreeNode {
    Leaf {
        /// Class probabilities of the training samples that reached this leaf
        distribution: Vec<f64>,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn leaf_distribution(&self, row: &[f64]) -> Result<&[f64]> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { distribution, .. } => return Ok(distribution),
                TreeNode::Split { feature, threshold, left, right } => {
                    // A restored tree may split on a column the row does not have
                    let value = row.get(*feature).ok_or(Error::InvalidDimension {
                        expected: *feature + 1,
                        actual: row.len(),
                    })?;
                    node = if *value <= *threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    root: Option<TreeNode>,
    n_features: usize,
    n_classes: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    min_samples_split: usize,
}

impl DecisionTreeClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            n_features: 0,
            n_classes: 0,
            max_depth: None,
            max_features: None,
            min_samples_split: 2,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Number of features examined per split before settling for the best
    /// one found. The search keeps going past this count while no usable
    /// split has been found.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Fit on all rows of `x`
    pub fn fit<R: Rng>(&mut self, x: &[Vec<f64>], y: &[usize], rng: &mut R) -> Result<()> {
        let indices: Vec<usize> = (0..x.len()).collect();
        let n_classes = y.iter().max().map_or(0, |m| m + 1).max(2);
        self.fit_indices(x, y, &indices, n_classes, rng)
    }

    /// Fit on the rows selected by `indices` (duplicates allowed, as produced
    /// by bootstrap sampling)
    pub fn fit_indices<R: Rng>(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
        rng: &mut R,
    ) -> Result<()> {
        if indices.is_empty() {
            return Err(Error::Training("cannot fit a tree on zero samples".to_string()));
        }
        if x.len() != y.len() {
            return Err(Error::Training(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[indices[0]].len();
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(Error::Training(format!(
                "label {bad} out of range for {n_classes} classes"
            )));
        }

        let mut builder = TreeBuilder {
            x,
            y,
            n_features,
            n_classes,
            max_depth: self.max_depth,
            max_features: self.max_features.unwrap_or(n_features).min(n_features),
            min_samples_split: self.min_samples_split,
            rng,
        };
        let mut working = indices.to_vec();
        self.root = Some(builder.build(&mut working, 0));
        self.n_features = n_features;
        self.n_classes = n_classes;
        Ok(())
    }

    pub fn predict_proba_one(&self, row: &[f64]) -> Result<&[f64]> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::Uninitialized("decision tree".to_string()))?;
        if row.len() != self.n_features {
            return Err(Error::InvalidDimension {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        root.leaf_distribution(row)
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<usize> {
        Ok(argmax(self.predict_proba_one(row)?))
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the largest value; ties resolve to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

/// Gini impurity from class counts: `1 - Σ p_i²`
pub fn gini_impurity(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

struct TreeBuilder<'a, R: Rng> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_features: usize,
    n_classes: usize,
    max_depth: Option<usize>,
    max_features: usize,
    min_samples_split: usize,
    rng: &'a mut R,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl<R: Rng> TreeBuilder<'_, R> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn leaf(counts: &[usize]) -> TreeNode {
        let n_samples: usize = counts.iter().sum();
        let n = n_samples.max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / n).collect(),
            n_samples,
        }
    }

    fn build(&mut self, indices: &mut [usize], depth: usize) -> TreeNode {
        let counts = self.class_counts(indices);
        let impurity = gini_impurity(&counts);

        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if impurity <= 0.0 || indices.len() < self.min_samples_split || depth_reached {
            return Self::leaf(&counts);
        }

        let Some(split) = self.find_split(indices, impurity) else {
            return Self::leaf(&counts);
        };

        let (mut left, mut right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return Self::leaf(&counts);
        }

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(&mut left, depth + 1)),
            right: Box::new(self.build(&mut right, depth + 1)),
        }
    }

    fn find_split(&mut self, indices: &mut [usize], parent_impurity: f64) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_for_feature(indices, feature) {
                let improves = candidate.impurity < parent_impurity - 1e-12;
                let better = best
                    .as_ref()
                    .map_or(true, |b| candidate.impurity < b.impurity);
                if improves && better {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_for_feature(&self, indices: &mut [usize], feature: usize) -> Option<SplitCandidate> {
        let x = self.x;
        indices.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let n = indices.len();
        let mut left = vec![0usize; self.n_classes];
        let mut right = self.class_counts(indices);
        let mut best: Option<SplitCandidate> = None;

        for k in 0..n - 1 {
            let label = self.y[indices[k]];
            left[label] += 1;
            right[label] -= 1;

            let current = x[indices[k]][feature];
            let next = x[indices[k + 1]][feature];
            if next - current <= 1e-12 {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = (n - k - 1) as f64;
            let impurity =
                (n_left * gini_impurity(&left) + n_right * gini_impurity(&right)) / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = (current + next) / 2.0;
                if threshold >= next {
                    threshold = current;
                }
                best = Some(SplitCandidate { feature, threshold, impurity });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gini_impurity() {
        assert_eq!(gini_impurity(&[4, 0]), 0.0);
        assert!((gini_impurity(&[2, 2]) - 0.5).abs() < 1e-12);
        assert_eq!(gini_impurity(&[0, 0]), 0.0);
    }

    #[test]
    fn test_argmax_ties_go_low() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
    }

    #[test]
    fn test_tree_separates_threshold_data() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 0.0]).collect();
        let y: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y, &mut rng).unwrap();

        assert_eq!(tree.predict_one(&[2.0, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict_one(&[15.0, 0.0]).unwrap(), 1);
        let root = tree.root().unwrap();
        assert_eq!(root.depth(), 1);
        match root {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 9.5).abs() < 1e-12);
            }
            TreeNode::Leaf { .. } => panic!("expected a split at the root"),
        }
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let y: Vec<usize> = (0..32).map(|i| i % 2).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let mut tree = DecisionTreeClassifier::new().with_max_depth(2);
        tree.fit(&x, &y, &mut rng).unwrap();
        assert!(tree.root().unwrap().depth() <= 2);

        let proba = tree.predict_proba_one(&[3.0]).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unfitted_tree_errors() {
        let tree = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.predict_one(&[1.0]),
            Err(Error::Uninitialized(_))
        ));
    }

    #[test]
    fn test_wrong_width_errors() {
        let x = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let y = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y, &mut rng).unwrap();
        assert!(matches!(
            tree.predict_one(&[1.0]),
            Err(Error::InvalidDimension { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_split_on_missing_column_errors() {
        let leaf = |p: f64| {
            Box::new(TreeNode::Leaf {
                distribution: vec![1.0 - p, p],
                n_samples: 1,
            })
        };
        let tree = DecisionTreeClassifier {
            root: Some(TreeNode::Split {
                feature: 4,
                threshold: 0.5,
                left: leaf(0.0),
                right: leaf(1.0),
            }),
            n_features: 2,
            n_classes: 2,
            ..DecisionTreeClassifier::new()
        };
        assert!(matches!(
            tree.predict_proba_one(&[0.0, 1.0]),
            Err(Error::InvalidDimension { expected: 5, actual: 2 })
        ));
    }
}
