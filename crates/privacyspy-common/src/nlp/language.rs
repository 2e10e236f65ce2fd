//! Stopword-profile language identification.
//!
//! Function words dominate running text in every language, so counting how many
//! sampled words fall into each language's stopword list is a cheap and stable
//! way to tell English prose from other European languages. Scripts without any
//! listed stopwords simply never reach the English threshold.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::LanguageIdentifier;

/// Words sampled from the start of the text.
const MAX_SAMPLE_WORDS: usize = 5000;
/// Minimum share of sampled words that must be English stopwords.
const MIN_ENGLISH_RATIO: f64 = 0.10;

struct Profile {
    code: &'static str,
    stopwords: HashSet<String>,
}

/// [`LanguageIdentifier`] comparing English against German, French, Spanish,
/// Italian, Portuguese, Dutch and Swedish stopword profiles.
pub struct StopwordLanguageIdentifier {
    profiles: Vec<Profile>,
}

impl Default for StopwordLanguageIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordLanguageIdentifier {
    pub fn new() -> Self {
        let profiles = [
            ("en", LANGUAGE::English),
            ("de", LANGUAGE::German),
            ("fr", LANGUAGE::French),
            ("es", LANGUAGE::Spanish),
            ("it", LANGUAGE::Italian),
            ("pt", LANGUAGE::Portuguese),
            ("nl", LANGUAGE::Dutch),
            ("sv", LANGUAGE::Swedish),
        ]
        .into_iter()
        .map(|(code, language)| Profile {
            code,
            stopwords: get(language).iter().map(|s| s.to_string()).collect(),
        })
        .collect();
        Self { profiles }
    }

    /// Stopword hits per language code, in profile order, plus the sample size.
    fn hits(&self, text: &str) -> (Vec<(&'static str, usize)>, usize) {
        let sample: Vec<String> = text
            .split(|c: char| !c.is_alphabetic() && c != '\'')
            .filter(|w| !w.is_empty())
            .take(MAX_SAMPLE_WORDS)
            .map(str::to_lowercase)
            .collect();

        let hits = self
            .profiles
            .iter()
            .map(|profile| {
                let count = sample
                    .iter()
                    .filter(|w| profile.stopwords.contains(w.as_str()))
                    .count();
                (profile.code, count)
            })
            .collect();
        (hits, sample.len())
    }
}

impl LanguageIdentifier for StopwordLanguageIdentifier {
    fn is_english(&self, text: &str) -> bool {
        let (hits, sampled) = self.hits(text);
        if sampled == 0 {
            return false;
        }

        let english = hits
            .iter()
            .find(|(code, _)| *code == "en")
            .map_or(0, |(_, count)| *count);
        let best_other = hits
            .iter()
            .filter(|(code, _)| *code != "en")
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0);
        let ratio = english as f64 / sampled as f64;

        debug!(sampled, english, best_other, ratio, "language profile");
        english > best_other && ratio >= MIN_ENGLISH_RATIO
    }
}
