//! Per-feature standardization.
//!
//! `z = (x - mean) / std`, with the population standard deviation computed
//! at fit time. The fitted statistics are part of a model artifact and are
//! persisted next to the estimator they were fitted with.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    mean: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.scale.is_some()
    }

    #[inline]
    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(Vec::len)
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    pub fn scale(&self) -> Option<&[f64]> {
        self.scale.as_deref()
    }

    /// Compute column means and standard deviations.
    /// Columns with zero variance get a scale of 1.0.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let first = rows
            .first()
            .ok_or_else(|| Error::Training("cannot fit scaler on zero rows".to_string()))?;
        let n_features = first.len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0; n_features];
        for row in rows {
            if row.len() != n_features {
                return Err(Error::InvalidDimension {
                    expected: n_features,
                    actual: row.len(),
                });
            }
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; n_features];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform_one(&self, row: &[f64]) -> Result<Vec<f64>> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Err(Error::Uninitialized("feature scaler".to_string()));
        };
        if row.len() != mean.len() {
            return Err(Error::InvalidDimension {
                expected: mean.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(mean)
            .zip(scale)
            .map(|((x, m), s)| (x - m) / s)
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_one(row)).collect()
    }

    pub fn fit_transform(&mut self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(rows)?;
        self.transform(rows)
    }
}
