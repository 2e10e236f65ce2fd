/// Sentence importance scoring.
///
/// A sentence's raw score is the average keyword weight over its content lemmas.
/// Lemmas missing from the weight table contribute nothing but still count
/// towards the length, so filler dilutes the score. Scores are then normalized
/// per document by the highest raw score, mapping the most important sentence to
/// exactly 1.0.
use crate::document::{Document, ScoredSentence};
use crate::weights::KeywordWeights;

/// Average weight per token. An empty token list scores 0.
pub fn score_sentence<S: AsRef<str>>(tokens: &[S], weights: &KeywordWeights) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let total: f64 = tokens
        .iter()
        .filter_map(|token| weights.get(token.as_ref()))
        .sum();
    total / tokens.len() as f64
}

/// Score every sentence of a document, preserving document order.
///
/// Normalization needs the document-wide maximum, so all raw scores are computed
/// before any normalized score. A non-positive maximum (empty document, no
/// keywords at all) yields 0 for every sentence. Sentences whose raw score is
/// negative are clamped to 0 so normalized scores stay within [0, 1].
pub fn score_document(document: &Document, weights: &KeywordWeights) -> Vec<ScoredSentence> {
    let raw: Vec<f64> = document
        .sentences
        .iter()
        .map(|sentence| score_sentence(&sentence.tokens, weights))
        .collect();

    let max = raw.iter().copied().fold(0.0_f64, f64::max);

    document
        .sentences
        .iter()
        .zip(raw)
        .map(|(sentence, raw_score)| ScoredSentence {
            text: sentence.text.clone(),
            raw_score,
            normalized_score: normalize(raw_score, max),
        })
        .collect()
}

fn normalize(raw_score: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (raw_score / max).max(0.0)
}
