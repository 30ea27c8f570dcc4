// TF-IDF vectorizer for short free-text documents
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, SparseVector};

/// English stop words removed before counting terms
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "be", "became", "because", "become", "becomes", "been", "before",
    "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "done", "down", "due", "during",
    "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former", "formerly", "from",
    "further", "had", "has", "have", "he", "hence", "her", "here", "hereafter", "hereby",
    "herein", "hers", "herself", "him", "himself", "his", "how", "however", "ie", "if", "in",
    "indeed", "into", "is", "it", "its", "itself", "just", "last", "latter", "latterly", "least",
    "less", "many", "may", "me", "meanwhile", "might", "more", "moreover", "most", "mostly",
    "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "per", "perhaps", "please", "rather", "re", "same",
    "seem", "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
    "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    // term -> column index (columns follow lexicographic term order)
    vocabulary: AHashMap<String, usize>,
    // column index -> smoothed inverse document frequency
    idf: Vec<f64>,
    stop_words: bool,
}

impl TfidfVectorizer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
            stop_words: false,
        }
    }

    #[must_use]
    pub fn with_english_stop_words(mut self) -> Self {
        self.stop_words = true;
        self
    }

    /// Tokenize text for indexing.
    /// Lowercases, splits on anything that is not alphanumeric and drops
    /// single-character tokens.
    #[inline]
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = Self::tokenize(text);
        if self.stop_words {
            tokens
                .into_iter()
                .filter(|t| !ENGLISH_STOP_WORDS.contains(&t.as_str()))
                .collect()
        } else {
            tokens
        }
    }

    /// Learn vocabulary and IDF weights from `documents`
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::InvalidConfig(
                "cannot fit TF-IDF on an empty corpus".to_string(),
            ));
        }

        // term -> number of documents containing it
        let mut doc_freq: AHashMap<String, u32> = AHashMap::new();
        for doc in documents {
            let mut tokens = self.analyze(doc.as_ref());
            tokens.sort_unstable();
            tokens.dedup();
            for token in tokens {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(Error::InvalidConfig(
                "TF-IDF vocabulary is empty after stop-word removal".to_string(),
            ));
        }

        let mut terms: Vec<(String, u32)> = doc_freq.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        // smooth idf: ln((1 + n) / (1 + df)) + 1
        let n_docs = documents.len() as f64;
        self.idf = terms
            .iter()
            .map(|(_, df)| ((1.0 + n_docs) / (1.0 + f64::from(*df))).ln() + 1.0)
            .collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        Ok(())
    }

    /// Project one document into the fitted space.
    /// Tokens missing from the vocabulary are ignored.
    pub fn transform_one(&self, text: &str) -> Result<SparseVector> {
        if self.idf.is_empty() {
            return Err(Error::Uninitialized("TF-IDF vectorizer".to_string()));
        }

        let pairs: Vec<(usize, f64)> = self
            .analyze(text)
            .iter()
            .filter_map(|token| self.vocabulary.get(token).map(|&idx| (idx, 1.0)))
            .collect();

        let mut vector = SparseVector::from_pairs(pairs);
        vector = SparseVector::from_pairs(
            vector.iter().map(|(idx, tf)| (idx, tf * self.idf[idx])).collect(),
        );
        vector.normalize();
        Ok(vector)
    }

    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        documents
            .iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    #[inline]
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    #[inline]
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    #[inline]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|idx| self.idf[idx])
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_punctuation_and_short_tokens() {
        let tokens = TfidfVectorizer::tokenize("E-commerce Industry & Energy A15");
        assert_eq!(tokens, vec!["commerce", "industry", "energy", "a15"]);
    }

    #[test]
    fn test_stop_words_are_removed() {
        let mut vectorizer = TfidfVectorizer::new().with_english_stop_words();
        vectorizer
            .fit(&["National Bank of Egypt", "Banque Misr"])
            .unwrap();
        assert!(vectorizer.term_index("of").is_none());
        assert!(vectorizer.term_index("bank").is_some());
        assert_eq!(vectorizer.vocabulary_size(), 5);
    }

    #[test]
    fn test_vocabulary_is_lexicographic() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["zeta alpha", "mid"]).unwrap();
        assert_eq!(vectorizer.term_index("alpha"), Some(0));
        assert_eq!(vectorizer.term_index("mid"), Some(1));
        assert_eq!(vectorizer.term_index("zeta"), Some(2));
    }

    #[test]
    fn test_rare_terms_get_higher_idf() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer
            .fit(&["fintech paymob", "fintech fawry", "banking misr"])
            .unwrap();
        let common = vectorizer.idf("fintech").unwrap();
        let rare = vectorizer.idf("banking").unwrap();
        assert!(rare > common);
        // ln(4/3) + 1
        assert!((common - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_transform_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::new();
        let rows = vectorizer
            .fit_transform(&["fintech paymob", "real estate city edge"])
            .unwrap();
        for row in rows {
            assert!((row.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["fintech paymob"]).unwrap();
        let v = vectorizer.transform_one("quantum fintech").unwrap();
        assert_eq!(v.nnz(), 1);
        assert!(vectorizer.transform_one("quantum").unwrap().is_zero());
    }

    #[test]
    fn test_unfitted_transform_fails() {
        let vectorizer = TfidfVectorizer::new();
        assert!(matches!(
            vectorizer.transform_one("fintech"),
            Err(Error::Uninitialized(_))
        ));
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let mut vectorizer = TfidfVectorizer::new().with_english_stop_words();
        let empty: [&str; 0] = [];
        assert!(vectorizer.fit(&empty).is_err());
        assert!(vectorizer.fit(&["the of and"]).is_err());
    }
}
