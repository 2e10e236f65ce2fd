//! Heuristic content-word analyzer.
//!
//! Approximates a part-of-speech filter restricted to verbs, nouns and proper
//! nouns: closed-class words (determiners, pronouns, prepositions, conjunctions,
//! auxiliaries, modals, quantifiers and the most common adverbs) are dropped,
//! as are numbers and one-letter tokens. Everything left is lemmatized.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::lemmatizer::Lemmatizer;
use super::segment::split_sentences;
use super::DocumentAnalyzer;
use crate::document::{Document, Sentence};
use crate::weights::KeywordWeights;

static FUNCTION_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // determiners and quantifiers
        "a", "an", "the", "this", "that", "these", "those", "some", "any", "all", "each",
        "every", "either", "neither", "no", "none", "both", "few", "many", "much", "more",
        "most", "other", "another", "such", "several", "own", "same",
        // pronouns
        "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you",
        "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
        "her", "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
        "themselves", "who", "whom", "whose", "which", "what", "whatever", "whichever",
        "whoever", "anyone", "anything", "everyone", "everything", "someone", "something",
        "nobody", "nothing",
        // prepositions
        "about", "above", "across", "after", "against", "along", "among", "around", "as",
        "at", "before", "behind", "below", "beneath", "beside", "between", "beyond", "by",
        "despite", "down", "during", "except", "for", "from", "in", "inside", "into", "like",
        "near", "of", "off", "on", "onto", "out", "outside", "over", "per", "since",
        "through", "throughout", "till", "to", "toward", "towards", "under", "until", "up",
        "upon", "via", "with", "within", "without",
        // conjunctions and complementizers
        "and", "but", "or", "nor", "so", "yet", "if", "unless", "because", "although",
        "though", "whether", "while", "whereas", "where", "when", "whenever", "wherever",
        "how", "why", "than", "then", "once",
        // auxiliaries and modals
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "done", "can", "cannot", "could", "may",
        "might", "must", "shall", "should", "will", "would", "ought", "can't", "don't",
        "doesn't", "won't", "isn't", "aren't", "we'll", "we're", "you're", "it's",
        // common adverbs and particles
        "not", "also", "only", "just", "very", "too", "there", "here", "now", "again",
        "always", "never", "often", "sometimes", "however", "therefore", "thus", "otherwise",
        "already", "still", "even", "ever", "else", "further", "furthermore", "moreover",
        "rather", "really", "well", "almost", "etc",
    ]
    .into_iter()
    .collect()
});

/// [`DocumentAnalyzer`] built from sentence segmentation, a closed-class word
/// filter and a rule-based lemmatizer.
#[derive(Debug, Clone, Default)]
pub struct HeuristicAnalyzer {
    lemmatizer: Lemmatizer,
}

impl HeuristicAnalyzer {
    pub fn new(lemmatizer: Lemmatizer) -> Self {
        Self { lemmatizer }
    }

    /// Analyzer whose lemmatizer prefers lemmas that carry a keyword weight.
    pub fn for_weights(weights: &KeywordWeights) -> Self {
        Self::new(Lemmatizer::with_vocabulary(weights.lemmas()))
    }

    /// Content-word lemmas of one sentence, in order.
    pub fn content_lemmas(&self, sentence: &str) -> Vec<String> {
        words(sentence)
            .enumerate()
            .filter_map(|(position, word)| self.content_lemma(position, word))
            .collect()
    }

    fn content_lemma(&self, position: usize, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if lower.chars().count() < 2
            || lower.chars().all(|c| c.is_ascii_digit())
            || FUNCTION_WORDS.contains(lower.as_str())
        {
            return None;
        }
        // Mid-sentence capitalized words are proper nouns and keep their form.
        if position > 0 && word.chars().next().is_some_and(char::is_uppercase) {
            return Some(lower);
        }
        Some(self.lemmatizer.lemmatize(&lower))
    }
}

impl DocumentAnalyzer for HeuristicAnalyzer {
    fn analyze(&self, text: &str) -> Document {
        split_sentences(text)
            .into_iter()
            .map(|sentence| {
                let tokens = self.content_lemmas(&sentence);
                Sentence::new(sentence, tokens)
            })
            .collect()
    }
}

/// Alphanumeric runs of a sentence; apostrophes between letters stay inside a word.
fn words(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|w| w.trim_matches(|c: char| c == '\'' || c == '\u{2019}'))
        .map(|w| w.strip_suffix("'s").unwrap_or(w))
        .filter(|w| !w.is_empty())
}
