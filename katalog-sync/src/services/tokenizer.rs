//! Text normalization and tokenization
//!
//! Produces stemmed token sets for fuzzy category-name matching. The stemmer
//! is a crude suffix stripper: it removes one common Russian inflectional
//! ending per token, which is enough to make "брюки"/"брюк" or
//! "женское"/"женский" compare equal without a morphology dependency.

/// Inflectional endings, longest first; at most one is stripped per token.
const ENDINGS: &[&str] = &[
    "иями", "ями", "ами", "ого", "его", "ому", "ему", "ыми", "ими", "ая", "яя", "ое", "ее", "ие",
    "ые", "ый", "ий", "ой", "ах", "ях", "ов", "ев", "ам", "ям", "ом", "ем", "ей", "ью", "а", "я",
    "о", "е", "ы", "и", "ь", "у", "ю", "й",
];

/// Minimum stem length (in characters) left after stripping
const MIN_STEM_CHARS: usize = 3;

/// Lowercase the text and replace every non-alphanumeric character with a
/// space, collapsing runs.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Strip one known inflectional ending, keeping at least [`MIN_STEM_CHARS`]
/// characters of stem.
pub fn stem(token: &str) -> String {
    let char_count = token.chars().count();
    for ending in ENDINGS {
        let ending_chars = ending.chars().count();
        if char_count >= MIN_STEM_CHARS + ending_chars && token.ends_with(ending) {
            return token
                .chars()
                .take(char_count - ending_chars)
                .collect();
        }
    }
    token.to_string()
}

/// Normalize, split and stem, preserving first-occurrence order and
/// deduplicating (token *set* semantics with stable iteration).
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in normalize(text).split_whitespace() {
        // single-character words are conjunctions/prepositions, not signal
        if word.chars().count() < 2 {
            continue;
        }
        let stemmed = stem(word);
        if !tokens.contains(&stemmed) {
            tokens.push(stemmed);
        }
    }
    tokens
}

/// Collapse a phrase to its space-joined stemmed form, for whole-string
/// substring comparison.
pub fn fold(text: &str) -> String {
    tokenize(text).join(" ")
}
