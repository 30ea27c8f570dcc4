//! Startup success classifier.
//!
//! A random forest over fifteen funding, backing, round and location
//! features, trained on a synthetic population whose success label is a
//! noisy, positively weighted combination of those features.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use startflow_core::dataset::{sample_normal, Dataset};
use startflow_core::{Error, RandomForestClassifier, Result, StandardScaler};
use startflow_storage::{ArtifactOrigin, FittedPair, Trainable};
use tracing::{info, warn};

use crate::{SAMPLE_COUNT, TEST_FRACTION, TRAINING_SEED};

pub const N_STARTUP_FEATURES: usize = 15;
pub const N_TREES: usize = 100;

/// Column order shared by training and inference
pub const STARTUP_FEATURE_NAMES: [&str; N_STARTUP_FEATURES] = [
    "funding_total_usd",
    "milestones",
    "has_VC",
    "has_angel",
    "has_roundA",
    "has_roundB",
    "has_roundC",
    "has_roundD",
    "avg_participants",
    "is_CA",
    "is_NY",
    "is_MA",
    "is_TX",
    "is_otherstate",
    "age_first_funding_years",
];

/// Positions of the 0/1 indicator columns
const INDICATOR_COLUMNS: [usize; 11] = [2, 3, 4, 5, 6, 7, 9, 10, 11, 12, 13];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StartupFeatures {
    pub funding_total_usd: f64,
    pub milestones: f64,
    #[serde(rename = "has_VC")]
    pub has_vc: f64,
    pub has_angel: f64,
    #[serde(rename = "has_roundA")]
    pub has_round_a: f64,
    #[serde(rename = "has_roundB")]
    pub has_round_b: f64,
    #[serde(rename = "has_roundC")]
    pub has_round_c: f64,
    #[serde(rename = "has_roundD")]
    pub has_round_d: f64,
    pub avg_participants: f64,
    #[serde(rename = "is_CA")]
    pub is_ca: f64,
    #[serde(rename = "is_NY")]
    pub is_ny: f64,
    #[serde(rename = "is_MA")]
    pub is_ma: f64,
    #[serde(rename = "is_TX")]
    pub is_tx: f64,
    pub is_otherstate: f64,
    pub age_first_funding_years: f64,
}

impl StartupFeatures {
    pub fn to_vector(&self) -> [f64; N_STARTUP_FEATURES] {
        [
            self.funding_total_usd,
            self.milestones,
            self.has_vc,
            self.has_angel,
            self.has_round_a,
            self.has_round_b,
            self.has_round_c,
            self.has_round_d,
            self.avg_participants,
            self.is_ca,
            self.is_ny,
            self.is_ma,
            self.is_tx,
            self.is_otherstate,
            self.age_first_funding_years,
        ]
    }

    /// Values must be finite and non-negative; indicators must be 0 or 1
    pub fn validate(&self) -> Result<()> {
        let values = self.to_vector();
        for (name, value) in STARTUP_FEATURE_NAMES.iter().zip(values) {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InputShape(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        for idx in INDICATOR_COLUMNS {
            if values[idx] != 0.0 && values[idx] != 1.0 {
                return Err(Error::InputShape(format!(
                    "{} must be 0 or 1, got {}",
                    STARTUP_FEATURE_NAMES[idx], values[idx]
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&[f64]> for StartupFeatures {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        let v: [f64; N_STARTUP_FEATURES] =
            values.try_into().map_err(|_| Error::InvalidDimension {
                expected: N_STARTUP_FEATURES,
                actual: values.len(),
            })?;
        Ok(Self {
            funding_total_usd: v[0],
            milestones: v[1],
            has_vc: v[2],
            has_angel: v[3],
            has_round_a: v[4],
            has_round_b: v[5],
            has_round_c: v[6],
            has_round_d: v[7],
            avg_participants: v[8],
            is_ca: v[9],
            is_ny: v[10],
            is_ma: v[11],
            is_tx: v[12],
            is_otherstate: v[13],
            age_first_funding_years: v[14],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPrediction {
    pub predicted_class: u8,
    pub success_probability: f64,
    pub failure_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SuccessPrediction {
    fn from_success_probability(success_probability: f64) -> Self {
        Self {
            predicted_class: u8::from(success_probability > 0.5),
            success_probability,
            failure_probability: 1.0 - success_probability,
            error: None,
        }
    }

    /// The sentinel returned when no prediction could be made
    pub fn degraded(error: impl ToString) -> Self {
        Self {
            predicted_class: 0,
            success_probability: 0.0,
            failure_probability: 1.0,
            error: Some(error.to_string()),
        }
    }

    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn risk_level(&self) -> RiskLevel {
        if self.success_probability > 0.7 {
            RiskLevel::Low
        } else if self.success_probability > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Synthetic training population, labelled 1 when the noisy propensity
/// score exceeds 0.5
pub fn generate_training_data(n_samples: usize, seed: u64) -> Dataset<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let mut flag = |p: f64| if rng.random_bool(p) { 1.0 } else { 0.0 };
        let has_vc = flag(0.3);
        let has_angel = flag(0.4);
        let has_round_a = flag(0.2);
        let has_round_b = flag(0.1);
        let has_round_c = flag(0.05);
        let has_round_d = flag(0.02);
        let is_ca = flag(0.2);
        let is_ny = flag(0.15);
        let is_ma = flag(0.1);
        let is_tx = flag(0.1);
        let is_otherstate = flag(0.3);

        let row = StartupFeatures {
            funding_total_usd: rng.random_range(10_000.0..10_000_000.0),
            milestones: rng.random_range(0..20) as f64,
            has_vc,
            has_angel,
            has_round_a,
            has_round_b,
            has_round_c,
            has_round_d,
            avg_participants: rng.random_range(1.0..10.0),
            is_ca,
            is_ny,
            is_ma,
            is_tx,
            is_otherstate,
            age_first_funding_years: rng.random_range(0.0..10.0),
        };

        let propensity = row.funding_total_usd / 1_000_000.0 * 0.1
            + row.milestones * 0.05
            + row.has_vc * 0.3
            + row.has_angel * 0.2
            + row.has_round_a * 0.15
            + row.has_round_b * 0.1
            + row.has_round_c * 0.05
            + row.has_round_d * 0.05
            + row.age_first_funding_years * 0.02
            + sample_normal(&mut rng, 0.0, 0.1);

        features.push(row.to_vector().to_vec());
        labels.push(usize::from(propensity > 0.5));
    }

    Dataset::new(features, labels)
}

#[derive(Debug)]
pub struct SuccessClassifier {
    forest: RandomForestClassifier,
    scaler: StandardScaler,
    origin: ArtifactOrigin,
}

impl SuccessClassifier {
    #[inline]
    pub fn origin(&self) -> ArtifactOrigin {
        self.origin
    }

    pub fn try_predict(&self, features: &StartupFeatures) -> Result<SuccessPrediction> {
        features.validate()?;
        let scaled = self.scaler.transform_one(&features.to_vector())?;
        let proba = self.forest.predict_proba_one(&scaled)?;
        let success = proba.get(1).copied().ok_or_else(|| {
            Error::Uninitialized("success classifier has no positive class".to_string())
        })?;
        Ok(SuccessPrediction::from_success_probability(success))
    }

    /// Like [`Self::try_predict`], but failures come back as a degraded
    /// prediction carrying the error message
    pub fn predict(&self, features: &StartupFeatures) -> SuccessPrediction {
        self.try_predict(features).unwrap_or_else(|e| {
            warn!("Success prediction degraded: {}", e);
            SuccessPrediction::degraded(e)
        })
    }
}

impl Trainable for SuccessClassifier {
    type Estimator = RandomForestClassifier;
    const COMPONENT: &'static str = "startup_success";

    fn train() -> Result<FittedPair<RandomForestClassifier>> {
        info!("Training startup success model");
        let data = generate_training_data(SAMPLE_COUNT, TRAINING_SEED);
        let (train, test) = data.train_test_split(TEST_FRACTION, TRAINING_SEED);

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&train.features)?;
        let x_test = scaler.transform(&test.features)?;

        let mut forest = RandomForestClassifier::new(N_TREES).with_random_state(TRAINING_SEED);
        forest.fit(&x_train, &train.targets)?;

        let train_accuracy = forest.score(&x_train, &train.targets)?;
        let test_accuracy = forest.score(&x_test, &test.targets)?;
        info!(
            "Startup success model: train accuracy {:.3}, test accuracy {:.3}",
            train_accuracy, test_accuracy
        );

        Ok(FittedPair::new(forest, scaler))
    }

    fn from_pair(pair: FittedPair<RandomForestClassifier>, origin: ArtifactOrigin) -> Result<Self> {
        let FittedPair { estimator, scaler } = pair;
        if !estimator.is_fitted() || estimator.n_classes() != 2 {
            return Err(Error::Persistence(
                "startup success forest is not a fitted binary classifier".to_string(),
            ));
        }
        for width in [scaler.n_features(), Some(estimator.n_features())] {
            if width != Some(N_STARTUP_FEATURES) {
                return Err(Error::InvalidDimension {
                    expected: N_STARTUP_FEATURES,
                    actual: width.unwrap_or(0),
                });
            }
        }
        Ok(Self {
            forest: estimator,
            scaler,
            origin,
        })
    }
}
