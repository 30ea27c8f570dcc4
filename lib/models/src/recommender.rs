// Content-similarity company recommender (TF-IDF + cosine)
use serde::{Deserialize, Serialize};
use startflow_core::{Error, Result, SparseVector, TfidfVectorizer};
use tracing::{debug, warn};

use crate::corpus::{companies, Company, MarketSize};

pub const DEFAULT_TOP_N: usize = 6;

/// Public view of a corpus entry. The similarity score is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCompany {
    pub name: String,
    pub category: String,
    pub funding_magnitude: String,
    pub market_size_tier: MarketSize,
}

impl From<&Company> for RecommendedCompany {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.to_string(),
            category: company.industry.to_string(),
            funding_magnitude: company.funding_magnitude(),
            market_size_tier: company.market_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub entries: Vec<RecommendedCompany>,
    pub count: usize,
    /// Set when similarity ranking failed and the funding fallback was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Recommendations {
    fn ranked(entries: Vec<RecommendedCompany>) -> Self {
        Self {
            count: entries.len(),
            entries,
            error: None,
        }
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

pub struct SimilarityRecommender {
    corpus: Vec<Company>,
    vectorizer: TfidfVectorizer,
    documents: Vec<SparseVector>,
}

impl SimilarityRecommender {
    /// Build over the built-in company corpus
    pub fn new() -> Result<Self> {
        Self::with_corpus(companies())
    }

    pub fn with_corpus(corpus: Vec<Company>) -> Result<Self> {
        let texts: Vec<String> = corpus.iter().map(Company::combined_text).collect();
        let mut vectorizer = TfidfVectorizer::new().with_english_stop_words();
        let documents = vectorizer.fit_transform(&texts)?;
        debug!(
            "Recommender fitted: {} documents, {} terms",
            documents.len(),
            vectorizer.vocabulary_size()
        );

        Ok(Self {
            corpus,
            vectorizer,
            documents,
        })
    }

    pub fn corpus(&self) -> &[Company] {
        &self.corpus
    }

    /// Corpus indices and similarities of the `top_n` best matches, best
    /// first. Equal scores keep corpus order.
    pub fn rank(&self, query: &str, top_n: usize) -> Result<Vec<(usize, f64)>> {
        if top_n == 0 {
            return Err(Error::InputShape("top_n must be at least 1".to_string()));
        }
        let query_vector = self.vectorizer.transform_one(query)?;
        if query_vector.is_zero() {
            return Err(Error::DegenerateInput(format!(
                "query '{query}' shares no terms with the corpus"
            )));
        }

        let mut scored: Vec<(usize, f64)> = self
            .documents
            .iter()
            .map(|doc| query_vector.cosine_similarity(doc))
            .enumerate()
            .collect();
        if let Some((idx, _)) = scored.iter().find(|(_, s)| !s.is_finite()) {
            return Err(Error::DegenerateInput(format!(
                "non-finite similarity for '{}'",
                self.corpus[*idx].name
            )));
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_n);
        Ok(scored)
    }

    pub fn try_recommend(&self, query: &str, top_n: usize) -> Result<Vec<RecommendedCompany>> {
        Ok(self
            .rank(query, top_n)?
            .into_iter()
            .map(|(idx, _)| RecommendedCompany::from(&self.corpus[idx]))
            .collect())
    }

    /// Top `top_n` companies for `query`. Never fails: when ranking is not
    /// possible the best-funded companies are returned with the cause.
    pub fn recommend(&self, query: &str, top_n: usize) -> Recommendations {
        match self.try_recommend(query, top_n) {
            Ok(entries) => Recommendations::ranked(entries),
            Err(e) => {
                warn!("Recommendation for '{}' fell back to funding order: {}", query, e);
                let mut fallback = Recommendations::ranked(self.top_funded(top_n));
                fallback.error = Some(e.to_string());
                fallback
            }
        }
    }

    /// Highest funding first, corpus order on ties
    pub fn top_funded(&self, top_n: usize) -> Vec<RecommendedCompany> {
        let mut order: Vec<&Company> = self.corpus.iter().collect();
        order.sort_by(|a, b| b.funding_millions.cmp(&a.funding_millions));
        order
            .into_iter()
            .take(top_n)
            .map(RecommendedCompany::from)
            .collect()
    }
}
