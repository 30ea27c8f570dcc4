// Random forest classifier: bagged CART trees with per-split feature sampling
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tree::{argmax, DecisionTreeClassifier};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    random_state: u64,
    max_depth: Option<usize>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Creates an unfitted forest of `n_estimators` trees
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            random_state: 0,
            max_depth: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Tree `i` is grown from a generator seeded with `random_state + i`
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        if x.is_empty() {
            return Err(Error::Training("cannot fit a forest on zero samples".to_string()));
        }
        if x.len() != y.len() {
            return Err(Error::Training(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != n_features) {
            return Err(Error::InvalidDimension {
                expected: n_features,
                actual: row.len(),
            });
        }

        let n_samples = x.len();
        let n_classes = y.iter().max().map_or(0, |m| m + 1).max(2);
        // sqrt(n_features) candidates per split
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let base_seed = self.random_state;
        let max_depth = self.max_depth;

        // collect() keeps tree order, so the fitted forest does not depend
        // on thread scheduling
        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| -> Result<DecisionTreeClassifier> {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
                let bootstrap = bootstrap_sample(n_samples, &mut rng);

                let mut tree = DecisionTreeClassifier::new().with_max_features(max_features);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit_indices(x, y, &bootstrap, n_classes, &mut rng)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.n_features = n_features;
        self.n_classes = n_classes;
        Ok(())
    }

    /// Mean of the trees' leaf class distributions
    pub fn predict_proba_one(&self, row: &[f64]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(Error::Uninitialized("random forest".to_string()));
        }
        if row.len() != self.n_features {
            return Err(Error::InvalidDimension {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, q) in proba.iter_mut().zip(tree.predict_proba_one(row)?) {
                *p += q;
            }
        }
        let n = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n;
        }
        Ok(proba)
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<usize> {
        Ok(argmax(&self.predict_proba_one(row)?))
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<usize>> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Accuracy on `(x, y)`
    pub fn score(&self, x: &[Vec<f64>], y: &[usize]) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(crate::dataset::accuracy(y, &predictions))
    }
}

/// Draw `n_samples` indices with replacement
fn bootstrap_sample<R: Rng>(n_samples: usize, rng: &mut R) -> Vec<usize> {
    (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let jitter = (i % 7) as f64 * 0.1;
            x.push(vec![1.0 + jitter, 1.0 - jitter, 0.0]);
            y.push(0);
            x.push(vec![5.0 + jitter, 5.0 - jitter, 0.0]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_forest_learns_separable_data() {
        let (x, y) = two_blobs();
        let mut forest = RandomForestClassifier::new(15).with_random_state(42);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict_one(&[1.2, 0.9, 0.0]).unwrap(), 0);
        assert_eq!(forest.predict_one(&[5.1, 4.8, 0.0]).unwrap(), 1);
        assert!(forest.score(&x, &y).unwrap() > 0.99);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = two_blobs();
        let mut forest = RandomForestClassifier::new(10).with_random_state(1);
        forest.fit(&x, &y).unwrap();

        let proba = forest.predict_proba_one(&[3.0, 3.0, 0.0]).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = two_blobs();
        let mut a = RandomForestClassifier::new(8).with_random_state(42);
        let mut b = RandomForestClassifier::new(8).with_random_state(42);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        for probe in [[3.0, 3.0, 0.0], [2.5, 4.0, 0.0], [4.4, 1.1, 0.0]] {
            assert_eq!(
                a.predict_proba_one(&probe).unwrap(),
                b.predict_proba_one(&probe).unwrap()
            );
        }
    }

    #[test]
    fn test_unfitted_forest_errors() {
        let forest = RandomForestClassifier::new(3);
        assert!(matches!(
            forest.predict_one(&[0.0]),
            Err(Error::Uninitialized(_))
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut forest = RandomForestClassifier::new(3);
        let x = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(forest.fit(&x, &[0, 1]).is_err());
    }
}
