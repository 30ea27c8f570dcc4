// Process-wide bundle of the three predictive components
use serde::Serialize;
use startflow_core::Result;
use startflow_storage::{train_or_load, ArtifactDescription, ArtifactStore, ModelSlot, Trainable};
use std::path::Path;
use tracing::info;

use crate::profit::{spending_insights, ProfitEstimator, ProfitPrediction, SpendFeatures, SpendingInsights};
use crate::recommender::{Recommendations, SimilarityRecommender};
use crate::success::{StartupFeatures, SuccessClassifier, SuccessPrediction};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsLoaded {
    pub recommendation: bool,
    pub startup_success: bool,
    pub profit_prediction: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub models_loaded: ModelsLoaded,
    pub artifacts: Vec<ArtifactDescription>,
}

/// Built once at start-up and shared with the transport
pub struct Services {
    store: ArtifactStore,
    recommender: SimilarityRecommender,
    success: ModelSlot<SuccessClassifier>,
    profit: ModelSlot<ProfitEstimator>,
}

impl Services {
    /// Prepare the components over the artifact directory `model_dir`.
    /// Only the recommender is built here; see [`Self::warm_up`].
    pub fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let store = ArtifactStore::new(model_dir)?;
        let recommender = SimilarityRecommender::new()?;
        info!("Recommender ready with {} companies", recommender.corpus().len());

        Ok(Self {
            store,
            recommender,
            success: ModelSlot::new("startup success model"),
            profit: ModelSlot::new("profit prediction model"),
        })
    }

    /// Train or restore both persisted models now
    pub fn warm_up(&self) -> Result<()> {
        self.success_classifier()?;
        self.profit_estimator()?;
        Ok(())
    }

    #[inline]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    #[inline]
    pub fn recommender(&self) -> &SimilarityRecommender {
        &self.recommender
    }

    pub fn success_classifier(&self) -> Result<&SuccessClassifier> {
        self.success.get_or_try_init(|| train_or_load(&self.store))
    }

    pub fn profit_estimator(&self) -> Result<&ProfitEstimator> {
        self.profit.get_or_try_init(|| train_or_load(&self.store))
    }

    pub fn recommend(&self, query: &str, top_n: usize) -> Recommendations {
        self.recommender.recommend(query, top_n)
    }

    pub fn predict_success(&self, features: &StartupFeatures) -> SuccessPrediction {
        match self.success_classifier() {
            Ok(model) => model.predict(features),
            Err(e) => SuccessPrediction::degraded(e),
        }
    }

    pub fn predict_profit(&self, features: &SpendFeatures) -> ProfitPrediction {
        match self.profit_estimator() {
            Ok(model) => model.predict(features),
            Err(e) => ProfitPrediction::degraded(e),
        }
    }

    pub fn spending_insights(&self, features: &SpendFeatures) -> SpendingInsights {
        spending_insights(features)
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            models_loaded: ModelsLoaded {
                recommendation: true,
                startup_success: self.success.is_initialized(),
                profit_prediction: self.profit.is_initialized(),
            },
            artifacts: [SuccessClassifier::COMPONENT, ProfitEstimator::COMPONENT]
                .iter()
                .filter_map(|component| self.store.describe(component))
                .collect(),
        }
    }
}
