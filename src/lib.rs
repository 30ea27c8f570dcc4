//! # StartFlow
//!
//! Predictive services for a startup ecosystem, served over HTTP:
//!
//! - **Company recommendations**: TF-IDF similarity between a free-text
//!   query and a fixed corpus of companies
//! - **Startup success**: random forest probability that a startup succeeds
//! - **Profit prediction**: linear profit estimate from R&D, administration
//!   and marketing spend, with allocation insights
//!
//! Trained models are persisted as estimator + scaler pairs and restored on
//! the next start; a missing or unreadable artifact is retrained.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! startflow --model-dir ./models --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use startflow::prelude::*;
//!
//! let services = Services::new("./models").unwrap();
//! services.warm_up().unwrap();
//!
//! let recommendations = services.recommend("Fintech", 6);
//! assert!(recommendations.count <= 6);
//!
//! let profit = services.predict_profit(&SpendFeatures::new(500_000.0, 200_000.0, 300_000.0));
//! println!("{} {}", profit.predicted_value, profit.unit);
//! ```
//!
//! ## Crate Structure
//!
//! - `startflow-core` - estimators and numeric primitives (TF-IDF, scaler, random forest, OLS)
//! - `startflow-storage` - artifact persistence and the train-or-load lifecycle
//! - `startflow-models` - the three predictive components
//! - `startflow-api` - REST API

// Re-export core types
pub use startflow_core::{
    Error, LinearRegression, RandomForestClassifier, Result, SparseVector, StandardScaler,
    TfidfVectorizer,
};

// Re-export storage
pub use startflow_storage::{train_or_load, ArtifactOrigin, ArtifactStore, FittedPair, ModelSlot, Trainable};

// Re-export models
pub use startflow_models::{
    spending_insights, ProfitEstimator, ProfitPrediction, Recommendations, RiskLevel, Services,
    SimilarityRecommender, SpendFeatures, SpendingInsights, StartupFeatures, SuccessClassifier,
    SuccessPrediction,
};

// Re-export API
pub use startflow_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Error, Result,
        ArtifactStore, Services,
        SimilarityRecommender, SuccessClassifier, ProfitEstimator,
        StartupFeatures, SpendFeatures,
        Recommendations, SuccessPrediction, ProfitPrediction, SpendingInsights,
        RestApi,
    };
}
