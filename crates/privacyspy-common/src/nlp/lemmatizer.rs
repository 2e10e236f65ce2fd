//! Rule-based English lemmatizer.
//!
//! Irregular forms come from a small lookup table. Regular inflections are undone
//! by suffix rules that may produce several candidate base forms; when a keyword
//! vocabulary is available the first candidate it knows wins, otherwise the rule's
//! preferred candidate is used. Scoring only distinguishes known lemmas from
//! unknown ones, so the vocabulary is what makes the rules precise where it matters.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("bought", "buy"),
        ("brought", "bring"),
        ("children", "child"),
        ("chose", "choose"),
        ("chosen", "choose"),
        ("data", "data"),
        ("gave", "give"),
        ("given", "give"),
        ("got", "get"),
        ("gotten", "get"),
        ("held", "hold"),
        ("kept", "keep"),
        ("knew", "know"),
        ("known", "know"),
        ("left", "leave"),
        ("made", "make"),
        ("men", "man"),
        ("paid", "pay"),
        ("people", "people"),
        ("sent", "send"),
        ("shown", "show"),
        ("sold", "sell"),
        ("spent", "spend"),
        ("taken", "take"),
        ("thought", "think"),
        ("told", "tell"),
        ("took", "take"),
        ("women", "woman"),
        ("written", "write"),
        ("wrote", "write"),
    ]
    .into_iter()
    .collect()
});

/// Maps lowercase word forms to lowercase lemmas.
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
    vocabulary: HashSet<String>,
}

impl Lemmatizer {
    /// A lemmatizer that prefers base forms present in `vocabulary`.
    pub fn with_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Lemma of a single word. The input is lowercased first.
    pub fn lemmatize(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if self.vocabulary.contains(&word) {
            return word;
        }
        if let Some(lemma) = IRREGULAR.get(word.as_str()) {
            return (*lemma).to_string();
        }

        let candidates = candidates(&word);
        candidates
            .iter()
            .find(|c| self.vocabulary.contains(c.as_str()))
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or(word)
    }
}

/// Candidate base forms, most likely first. Empty when no rule applies.
fn candidates(word: &str) -> Vec<String> {
    let len = word.chars().count();
    if len <= 3 || !word.is_ascii() {
        return Vec::new();
    }

    if let Some(stem) = word.strip_suffix("ies").filter(|_| len > 4) {
        // cookies -> cookie, movies -> movie; policies -> policy
        if stem.ends_with(['k', 'v', 'b']) {
            return vec![format!("{stem}ie"), format!("{stem}y")];
        }
        return vec![format!("{stem}y"), format!("{stem}ie")];
    }
    if let Some(stem) = word.strip_suffix("ied").filter(|_| len > 4) {
        return vec![format!("{stem}y"), format!("{stem}ie")];
    }
    if word.ends_with("sses")
        || word.ends_with("shes")
        || word.ends_with("ches")
        || word.ends_with("xes")
        || word.ends_with("zzes")
    {
        let stem = &word[..word.len() - 2];
        return vec![stem.to_string(), format!("{stem}e")];
    }
    if word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return vec![word[..word.len() - 1].to_string()];
    }
    if let Some(stem) = word.strip_suffix("ed") {
        return verb_stem_candidates(stem);
    }
    if let Some(stem) = word.strip_suffix("ing") {
        return verb_stem_candidates(stem);
    }
    Vec::new()
}

/// Base forms for a verb stem left after removing `-ed` or `-ing`.
fn verb_stem_candidates(stem: &str) -> Vec<String> {
    if stem.len() < 2 || !stem.chars().any(is_vowel) {
        return Vec::new();
    }

    let chars: Vec<char> = stem.chars().collect();
    let last = chars[chars.len() - 1];
    let prev = chars[chars.len() - 2];

    // stopped -> stop, but not called -> cal or passed -> pas
    if last == prev && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        let undoubled = &stem[..stem.len() - 1];
        return vec![undoubled.to_string(), stem.to_string()];
    }

    let with_e = format!("{stem}e");
    if wants_silent_e(&chars) {
        vec![with_e, stem.to_string()]
    } else {
        vec![stem.to_string(), with_e]
    }
}

/// Whether a stem most likely lost a silent `e` (shar-ed, us-ing, receiv-ed).
fn wants_silent_e(chars: &[char]) -> bool {
    let n = chars.len();
    let last = chars[n - 1];
    if matches!(last, 'v' | 'c' | 'g' | 'z') {
        return true;
    }
    if is_vowel(last) || matches!(last, 'w' | 'x' | 'y') {
        return false;
    }
    if n == 2 {
        return is_vowel(chars[0]);
    }
    let tail: String = chars[n - 2..].iter().collect();
    if matches!(tail.as_str(), "er" | "en" | "on" | "om" | "it" | "et" | "el") {
        return false;
    }
    is_vowel(chars[n - 2]) && !is_vowel(chars[n - 3])
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
