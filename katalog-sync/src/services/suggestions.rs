//! Suggestion finder for failed vocabulary validation
//!
//! Offers up to five vocabulary entries close to an invalid value.
//! Closeness is a substring test in either direction over stemmed,
//! lowercased forms, so suffix variants ("КРАСНЫЙ" vs "КРАСНОВАТЫЙ")
//! surface too. The `threshold` parameter is accepted for interface
//! stability but does not weight the result; any substring hit qualifies.

use crate::services::tokenizer;
use std::collections::HashSet;

/// Maximum number of suggestions returned
const MAX_SUGGESTIONS: usize = 5;

/// Find vocabulary entries similar to `value`, sorted lexicographically and
/// capped at five.
pub fn find_similar(value: &str, vocabulary: &HashSet<String>, _threshold: f64) -> Vec<String> {
    let needle = tokenizer::fold(value);
    if needle.is_empty() || vocabulary.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<String> = vocabulary
        .iter()
        .filter(|candidate| {
            let folded = tokenizer::fold(candidate);
            !folded.is_empty() && (folded.contains(&needle) || needle.contains(&folded))
        })
        .cloned()
        .collect();

    hits.sort();
    hits.truncate(MAX_SUGGESTIONS);
    hits
}
