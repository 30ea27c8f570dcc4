//! # StartFlow Models
//!
//! The three predictive components served by StartFlow:
//!
//! - [`SimilarityRecommender`] - ranks a fixed company corpus against a free-text query
//! - [`SuccessClassifier`] - random forest over fifteen startup features
//! - [`ProfitEstimator`] - linear profit model over three spend categories,
//!   plus [`spending_insights`] on the allocation itself
//!
//! The two trained components follow the train-or-load lifecycle of
//! `startflow-storage`; [`Services`] bundles all three for the transport.

pub mod corpus;
pub mod profit;
pub mod recommender;
pub mod services;
pub mod success;

pub use corpus::{Company, MarketSize, COMPANIES};
pub use profit::{
    spending_insights, ProfitEstimator, ProfitPrediction, SpendBreakdown, SpendFeatures,
    SpendingInsights, SpendingReport,
};
pub use recommender::{Recommendations, RecommendedCompany, SimilarityRecommender, DEFAULT_TOP_N};
pub use services::{ModelsLoaded, ServiceStatus, Services};
pub use success::{RiskLevel, StartupFeatures, SuccessClassifier, SuccessPrediction};

/// Rows generated per synthetic training set
pub const SAMPLE_COUNT: usize = 1000;
/// Seed for data generation, splitting and the forest
pub const TRAINING_SEED: u64 = 42;
pub const TEST_FRACTION: f64 = 0.2;
