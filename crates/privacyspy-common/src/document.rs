use serde::{Deserialize, Serialize};

/// One sentence of a policy, reduced to its content-word lemmas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Lowercase lemmas of the verbs, nouns and proper nouns, in order.
    pub tokens: Vec<String>,
    /// The sentence as it appeared in the source, line breaks included.
    pub text: String,
}

impl Sentence {
    pub fn new(text: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            tokens,
            text: text.into(),
        }
    }
}

/// Sentences in order of appearance in the source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }
}

impl FromIterator<Sentence> for Document {
    fn from_iter<T: IntoIterator<Item = Sentence>>(iter: T) -> Self {
        Self {
            sentences: iter.into_iter().collect(),
        }
    }
}

/// A sentence with its raw and document-normalized importance scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub text: String,
    /// Average keyword weight per content lemma.
    pub raw_score: f64,
    /// `raw_score` divided by the highest raw score in the same document.
    pub normalized_score: f64,
}
