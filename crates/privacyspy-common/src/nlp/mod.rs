//! Natural language processing collaborators of the scorer.
//!
//! The scorer only needs two capabilities from this layer, both expressed as
//! traits so the pipeline can be exercised with hand-built fixtures:
//! - [`LanguageIdentifier`]: gate non-English text before any analysis
//! - [`DocumentAnalyzer`]: turn prose into sentences of content-word lemmas

pub mod analyzer;
pub mod language;
pub mod lemmatizer;
pub mod segment;

pub use analyzer::HeuristicAnalyzer;
pub use language::StopwordLanguageIdentifier;
pub use lemmatizer::Lemmatizer;

use crate::document::Document;

/// Decides whether a text is English.
pub trait LanguageIdentifier: Send + Sync {
    fn is_english(&self, text: &str) -> bool;
}

/// Splits text into sentences and reduces each to lowercase content-word lemmas.
pub trait DocumentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Document;
}
