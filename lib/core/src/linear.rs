// Ordinary least squares regression
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinearRegression {
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit `y ≈ X·β + b` by solving the normal equations
    /// `(AᵀA) w = Aᵀy` where `A = [1 | X]`.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let n_samples = x.len();
        if n_samples != y.len() {
            return Err(Error::Training(format!(
                "feature rows ({n_samples}) and targets ({}) differ in length",
                y.len()
            )));
        }
        let n_features = x.first().map_or(0, Vec::len);
        if n_samples < n_features + 1 {
            return Err(Error::Training(format!(
                "need at least {} samples to fit {n_features} coefficients and an intercept",
                n_features + 1
            )));
        }

        let dim = n_features + 1;
        let mut xtx = vec![vec![0.0; dim]; dim];
        let mut xty = vec![0.0; dim];
        let mut design = vec![0.0; dim];

        for (row, &target) in x.iter().zip(y) {
            if row.len() != n_features {
                return Err(Error::InvalidDimension {
                    expected: n_features,
                    actual: row.len(),
                });
            }
            design[0] = 1.0;
            design[1..].copy_from_slice(row);
            for i in 0..dim {
                xty[i] += design[i] * target;
                for j in 0..=i {
                    xtx[i][j] += design[i] * design[j];
                }
            }
        }
        for i in 0..dim {
            for j in (i + 1)..dim {
                xtx[i][j] = xtx[j][i];
            }
        }

        let beta = cholesky_solve(&xtx, &xty)?;
        self.intercept = beta[0];
        self.coefficients = Some(beta[1..].to_vec());
        Ok(())
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| Error::Uninitialized("linear regression".to_string()))?;
        if row.len() != coefficients.len() {
            return Err(Error::InvalidDimension {
                expected: coefficients.len(),
                actual: row.len(),
            });
        }
        Ok(self.intercept + row.iter().zip(coefficients).map(|(x, w)| x * w).sum::<f64>())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// Solve `A x = b` for symmetric positive definite `A`
fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = a[i][i] - sum;
                if diag <= a[i][i].abs() * 1e-10 || !diag.is_finite() {
                    return Err(Error::Training(
                        "design matrix is singular; features are collinear or constant".to_string(),
                    ));
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    // forward: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i][k] * z[k]).sum();
        z[i] = (b[i] - sum) / l[i][i];
    }

    // backward: Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|k| l[k][i] * x[k]).sum();
        x[i] = (z[i] - sum) / l[i][i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_linear_relation() {
        // y = 3 + 2a - b
        let x: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, (i * i) as f64 / 4.0])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((model.intercept() - 3.0).abs() < 1e-6);
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!((coef[1] + 1.0).abs() < 1e-6);
        assert!((model.predict_one(&[10.0, 5.0]).unwrap() - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_features_rejected() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let y: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let mut model = LinearRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(Error::Training(_))));
    }

    #[test]
    fn test_too_few_samples_rejected() {
        let mut model = LinearRegression::new();
        assert!(model.fit(&[vec![1.0, 2.0]], &[1.0]).is_err());
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict_one(&[1.0]),
            Err(Error::Uninitialized(_))
        ));
    }
}
