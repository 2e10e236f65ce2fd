//! Sentence segmentation.
//!
//! Paragraphs (blank-line separated) never share a sentence. Inside a paragraph a
//! sentence ends at `.`, `!` or `?` (plus any trailing closing quotes or
//! brackets) when followed by whitespace and something that can open a sentence.
//! Single line breaks are kept in the sentence text.

use std::sync::LazyLock;

use regex::Regex;

/// A blank line (optionally holding spaces or tabs) between two paragraphs.
pub(crate) static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid regex"));

/// Words whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "inc", "ltd", "co", "no", "mr", "mrs", "ms", "dr", "st", "vs", "u.s", "u.k",
];

/// Split text into trimmed sentence strings, in order of appearance.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let mut sentences = Vec::new();
    for paragraph in PARAGRAPH_BREAK.split(&normalized) {
        split_paragraph(paragraph, &mut sentences);
    }
    sentences
}

fn split_paragraph(paragraph: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (offset, c) = chars[i];
        if !is_terminator(c) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (is_terminator(chars[j].1) || is_closing(chars[j].1)) {
            j += 1;
        }
        let mut k = j;
        while k < chars.len() && chars[k].1.is_whitespace() {
            k += 1;
        }

        let boundary = k > j
            && k < chars.len()
            && opens_sentence(chars[k].1)
            && !(c == '.' && ends_with_abbreviation(&paragraph[start..offset]));

        if boundary {
            push_trimmed(&paragraph[start..chars[j].0], out);
            start = chars[k].0;
            i = k;
        } else {
            i = j;
        }
    }

    push_trimmed(&paragraph[start..], out);
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

fn opens_sentence(c: char) -> bool {
    c.is_uppercase()
        || c.is_ascii_digit()
        || matches!(c, '"' | '\'' | '(' | '[' | '\u{201c}' | '\u{2018}')
}

fn ends_with_abbreviation(before: &str) -> bool {
    let Some(word) = before.split_whitespace().last() else {
        return false;
    };
    let word = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if word.chars().count() == 1 && word.chars().all(char::is_alphabetic) {
        return true;
    }
    ABBREVIATIONS.contains(&word.as_str())
}

fn push_trimmed(sentence: &str, out: &mut Vec<String>) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
