//! Training-data helpers: seeded splitting, Gaussian noise and the
//! evaluation metrics reported after each training run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A feature matrix with one target per row
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<T>,
}

impl<T: Clone> Dataset<T> {
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<T>) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self { features, targets }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i].clone()).collect(),
        }
    }

    /// Shuffle with `seed` and split into `(train, test)`; the test part
    /// receives `ceil(len * test_fraction)` rows.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = ((self.len() as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
        let (test, train) = indices.split_at(n_test.min(self.len()));
        (self.select(train), self.select(test))
    }
}

/// One draw from N(mean, std) via the Box-Muller transform
pub fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std * z
}

/// Fraction of predictions equal to the true label
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Coefficient of determination
pub fn r2_score(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_res: f64 = truth.iter().zip(predicted).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Root mean squared error
pub fn rmse(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let mse = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / truth.len() as f64;
    mse.sqrt()
}
