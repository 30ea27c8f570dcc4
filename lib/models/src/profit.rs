// Profit estimator (OLS over R&D, administration and marketing spend) and
// spend allocation insights
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use startflow_core::dataset::{r2_score, rmse, sample_normal, Dataset};
use startflow_core::{Error, LinearRegression, Result, StandardScaler};
use startflow_storage::{ArtifactOrigin, FittedPair, Trainable};
use tracing::{info, warn};

use crate::{SAMPLE_COUNT, TEST_FRACTION, TRAINING_SEED};

pub const N_SPEND_FEATURES: usize = 3;

/// Reported with every prediction. Not derived from the fitted model.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.85;
pub const CURRENCY: &str = "USD";

const MIN_PROFIT: f64 = 1_000.0;

pub const LOW_RND_ADVISORY: &str = "Consider increasing R&D spending for better innovation potential";
pub const HIGH_MARKETING_ADVISORY: &str = "Marketing spending seems high, consider rebalancing";
pub const HIGH_ADMIN_ADVISORY: &str = "Administrative costs are high, look for efficiency improvements";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendFeatures {
    #[serde(rename = "RnD_Spend")]
    pub rnd_spend: f64,
    #[serde(rename = "Administration")]
    pub administration: f64,
    #[serde(rename = "Marketing_Spend")]
    pub marketing_spend: f64,
}

impl SpendFeatures {
    pub fn new(rnd_spend: f64, administration: f64, marketing_spend: f64) -> Self {
        Self {
            rnd_spend,
            administration,
            marketing_spend,
        }
    }

    pub fn to_vector(&self) -> [f64; N_SPEND_FEATURES] {
        [self.rnd_spend, self.administration, self.marketing_spend]
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.rnd_spend + self.administration + self.marketing_spend
    }

    pub fn validate(&self) -> Result<()> {
        let names = ["RnD_Spend", "Administration", "Marketing_Spend"];
        for (name, value) in names.iter().zip(self.to_vector()) {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InputShape(format!(
                    "{name} must be a finite non-negative amount, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&[f64]> for SpendFeatures {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match *values {
            [rnd, admin, marketing] => Ok(Self::new(rnd, admin, marketing)),
            _ => Err(Error::InvalidDimension {
                expected: N_SPEND_FEATURES,
                actual: values.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPrediction {
    pub predicted_value: f64,
    pub confidence: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfitPrediction {
    pub fn degraded(error: impl ToString) -> Self {
        Self {
            predicted_value: 0.0,
            confidence: 0.0,
            unit: CURRENCY.to_string(),
            error: Some(error.to_string()),
        }
    }

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendBreakdown {
    pub rnd_percentage: f64,
    pub admin_percentage: f64,
    pub marketing_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingReport {
    pub total_spending: f64,
    pub breakdown: SpendBreakdown,
    pub advisories: Vec<String>,
}

/// Either a report or the reason one could not be produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpendingInsights {
    Report(SpendingReport),
    Failed { error: String },
}

impl SpendingInsights {
    pub fn report(&self) -> Option<&SpendingReport> {
        match self {
            SpendingInsights::Report(report) => Some(report),
            SpendingInsights::Failed { .. } => None,
        }
    }
}

pub fn try_spending_insights(features: &SpendFeatures) -> Result<SpendingReport> {
    let total = features.total();
    if total <= 0.0 || !total.is_finite() {
        return Err(Error::DegenerateInput(format!(
            "total spending must be positive to compute allocation, got {total}"
        )));
    }

    let rnd_share = features.rnd_spend / total;
    let admin_share = features.administration / total;
    let marketing_share = features.marketing_spend / total;

    let mut advisories = Vec::new();
    if rnd_share < 0.3 {
        advisories.push(LOW_RND_ADVISORY.to_string());
    }
    if marketing_share > 0.6 {
        advisories.push(HIGH_MARKETING_ADVISORY.to_string());
    }
    if admin_share > 0.4 {
        advisories.push(HIGH_ADMIN_ADVISORY.to_string());
    }

    Ok(SpendingReport {
        total_spending: total,
        breakdown: SpendBreakdown {
            rnd_percentage: rnd_share * 100.0,
            admin_percentage: admin_share * 100.0,
            marketing_percentage: marketing_share * 100.0,
        },
        advisories,
    })
}

/// Allocation report for `features`; a zero total yields `Failed`
pub fn spending_insights(features: &SpendFeatures) -> SpendingInsights {
    match try_spending_insights(features) {
        Ok(report) => SpendingInsights::Report(report),
        Err(e) => SpendingInsights::Failed {
            error: format!("Error generating insights: {e}"),
        },
    }
}

/// Synthetic spend population; profit is a weighted sum of the three spends
/// plus noise, floored at a small positive minimum
pub fn generate_training_data(n_samples: usize, seed: u64) -> Dataset<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let rnd = rng.random_range(10_000.0..1_000_000.0);
        let admin = rng.random_range(5_000.0..500_000.0);
        let marketing = rng.random_range(5_000.0..800_000.0);
        let noise = sample_normal(&mut rng, 0.0, 50_000.0);

        let profit = rnd * 0.8 + marketing * 0.6 + admin * 0.3 + noise;
        features.push(vec![rnd, admin, marketing]);
        targets.push(profit.max(MIN_PROFIT));
    }

    Dataset::new(features, targets)
}

#[derive(Debug)]
pub struct ProfitEstimator {
    model: LinearRegression,
    scaler: StandardScaler,
    origin: ArtifactOrigin,
}

impl ProfitEstimator {
    #[inline]
    pub fn origin(&self) -> ArtifactOrigin {
        self.origin
    }

    pub fn try_predict(&self, features: &SpendFeatures) -> Result<ProfitPrediction> {
        features.validate()?;
        let scaled = self.scaler.transform_one(&features.to_vector())?;
        let predicted_value = self.model.predict_one(&scaled)?;
        Ok(ProfitPrediction {
            predicted_value,
            confidence: PLACEHOLDER_CONFIDENCE,
            unit: CURRENCY.to_string(),
            error: None,
        })
    }

    pub fn predict(&self, features: &SpendFeatures) -> ProfitPrediction {
        self.try_predict(features).unwrap_or_else(|e| {
            warn!("Profit prediction degraded: {}", e);
            ProfitPrediction::degraded(e)
        })
    }
}

impl Trainable for ProfitEstimator {
    type Estimator = LinearRegression;
    const COMPONENT: &'static str = "profit_prediction";

    fn train() -> Result<FittedPair<LinearRegression>> {
        info!("Training profit prediction model");
        let data = generate_training_data(SAMPLE_COUNT, TRAINING_SEED);
        let (train, test) = data.train_test_split(TEST_FRACTION, TRAINING_SEED);

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&train.features)?;
        let x_test = scaler.transform(&test.features)?;

        let mut model = LinearRegression::new();
        model.fit(&x_train, &train.targets)?;

        let train_pred = model.predict(&x_train)?;
        let test_pred = model.predict(&x_test)?;
        info!(
            "Profit model: train R² {:.3}, test R² {:.3}, train RMSE ${:.2}, test RMSE ${:.2}",
            r2_score(&train.targets, &train_pred),
            r2_score(&test.targets, &test_pred),
            rmse(&train.targets, &train_pred),
            rmse(&test.targets, &test_pred)
        );

        Ok(FittedPair::new(model, scaler))
    }

    fn from_pair(pair: FittedPair<LinearRegression>, origin: ArtifactOrigin) -> Result<Self> {
        let FittedPair { estimator, scaler } = pair;
        let model_width = estimator.coefficients().map(<[f64]>::len);
        for width in [scaler.n_features(), model_width] {
            if width != Some(N_SPEND_FEATURES) {
                return Err(Error::InvalidDimension {
                    expected: N_SPEND_FEATURES,
                    actual: width.unwrap_or(0),
                });
            }
        }
        Ok(Self {
            model: estimator,
            scaler,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use startflow_storage::{train_or_load, ArtifactStore};

    fn trained() -> ProfitEstimator {
        let pair = ProfitEstimator::train().unwrap();
        ProfitEstimator::from_pair(pair, ArtifactOrigin::Trained).unwrap()
    }

    #[test]
    fn test_training_data_respects_floor() {
        let data = generate_training_data(500, 42);
        assert_eq!(data.len(), 500);
        assert!(data.targets.iter().all(|&p| p >= MIN_PROFIT));
        assert_eq!(data, generate_training_data(500, 42));
    }

    #[test]
    fn test_model_recovers_weights() {
        let model = trained();
        let base = model
            .try_predict(&SpendFeatures::new(500_000.0, 200_000.0, 300_000.0))
            .unwrap();
        let more_rnd = model
            .try_predict(&SpendFeatures::new(600_000.0, 200_000.0, 300_000.0))
            .unwrap();

        // ~0.8 per extra R&D dollar
        let slope = (more_rnd.predicted_value - base.predicted_value) / 100_000.0;
        assert!((slope - 0.8).abs() < 0.05, "slope {slope}");
    }

    #[test]
    fn test_reference_scenario() {
        let model = trained();
        let p = model.predict(&SpendFeatures::new(500_000.0, 200_000.0, 300_000.0));
        assert!(!p.is_degraded());
        assert!(p.predicted_value > 0.0);
        assert_eq!(p.unit, "USD");
        assert_eq!(p.confidence, PLACEHOLDER_CONFIDENCE);
    }

    #[test]
    fn test_restored_model_predicts_identically() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp_dir.path()).unwrap();
        let first: ProfitEstimator = train_or_load(&store).unwrap();
        let second: ProfitEstimator = train_or_load(&store).unwrap();
        assert_eq!(second.origin(), ArtifactOrigin::Restored);

        let input = SpendFeatures::new(120_000.0, 45_000.0, 310_000.0);
        assert_eq!(first.predict(&input), second.predict(&input));
    }

    #[test]
    fn test_breakdown_sums_to_hundred() {
        for features in [
            SpendFeatures::new(500_000.0, 200_000.0, 300_000.0),
            SpendFeatures::new(1.0, 0.0, 0.0),
            SpendFeatures::new(3.3, 7.1, 11.9),
        ] {
            let report = try_spending_insights(&features).unwrap();
            let b = &report.breakdown;
            let sum = b.rnd_percentage + b.admin_percentage + b.marketing_percentage;
            assert!((sum - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_advisory_rules() {
        let balanced = try_spending_insights(&SpendFeatures::new(50.0, 20.0, 30.0)).unwrap();
        assert!(balanced.advisories.is_empty());

        let marketing_heavy = try_spending_insights(&SpendFeatures::new(10.0, 20.0, 70.0)).unwrap();
        assert_eq!(
            marketing_heavy.advisories,
            vec![LOW_RND_ADVISORY.to_string(), HIGH_MARKETING_ADVISORY.to_string()]
        );

        let admin_heavy = try_spending_insights(&SpendFeatures::new(40.0, 50.0, 10.0)).unwrap();
        assert_eq!(admin_heavy.advisories, vec![HIGH_ADMIN_ADVISORY.to_string()]);
    }

    #[test]
    fn test_zero_total_is_structured_error() {
        let insights = spending_insights(&SpendFeatures::default());
        assert!(insights.report().is_none());

        let json = serde_json::to_value(&insights).unwrap();
        assert!(json["error"].as_str().unwrap().contains("total spending"));
        assert!(json.get("breakdown").is_none());
    }

    #[test]
    fn test_report_serializes_flat() {
        let insights = spending_insights(&SpendFeatures::new(10.0, 20.0, 70.0));
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["totalSpending"], 100.0);
        assert!(json["breakdown"]["marketingPercentage"].as_f64().unwrap() > 69.0);
        assert_eq!(json["advisories"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_input_validation() {
        assert!(SpendFeatures::new(1.0, 2.0, 3.0).validate().is_ok());
        assert!(SpendFeatures::new(-1.0, 2.0, 3.0).validate().is_err());
        assert!(SpendFeatures::new(1.0, f64::INFINITY, 3.0).validate().is_err());
        assert!(matches!(
            SpendFeatures::try_from(&[1.0, 2.0][..]),
            Err(Error::InvalidDimension { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_invalid_spend_degrades() {
        let model = trained();
        for spend in [
            SpendFeatures::new(f64::NAN, 1.0, 1.0),
            SpendFeatures::new(1.0, -5.0, 1.0),
        ] {
            assert!(matches!(model.try_predict(&spend), Err(Error::InputShape(_))));
            let prediction = model.predict(&spend);
            assert!(prediction.error.is_some());
            assert_eq!(prediction.predicted_value, 0.0);
        }
    }
}
