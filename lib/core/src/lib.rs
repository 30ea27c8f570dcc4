//! # StartFlow Core
//!
//! Estimators and numeric primitives behind the StartFlow predictive
//! services.
//!
//! - [`TfidfVectorizer`] - smoothed TF-IDF over short documents with English stop words
//! - [`SparseVector`] - sparse term vectors with cosine similarity
//! - [`StandardScaler`] - per-feature standardization
//! - [`RandomForestClassifier`] - bagged CART trees with class probabilities
//! - [`LinearRegression`] - ordinary least squares with intercept
//! - [`dataset`] - seeded train/test split, Gaussian noise, evaluation metrics
//!
//! ## Example
//!
//! ```rust
//! use startflow_core::TfidfVectorizer;
//!
//! let docs = ["Fintech Paymob", "Banking Banque Misr", "Fintech Fawry"];
//! let mut vectorizer = TfidfVectorizer::new().with_english_stop_words();
//! let matrix = vectorizer.fit_transform(&docs).unwrap();
//!
//! let query = vectorizer.transform_one("fintech").unwrap();
//! assert!(query.cosine_similarity(&matrix[0]) > query.cosine_similarity(&matrix[1]));
//! ```

pub mod dataset;
pub mod error;
pub mod forest;
pub mod linear;
pub mod scaler;
pub mod tfidf;
pub mod tree;
pub mod vector;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use forest::RandomForestClassifier;
pub use linear::LinearRegression;
pub use scaler::StandardScaler;
pub use tfidf::TfidfVectorizer;
pub use tree::{DecisionTreeClassifier, TreeNode};
pub use vector::SparseVector;
