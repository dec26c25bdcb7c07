//! Blank-line segmentation of the raw completion, plus the lexical
//! substitution pass. Both are pure so that drift in model formatting is a
//! contained, testable failure rather than silent corruption downstream.

use crate::services::prompt::{ABBREVIATIONS, PLACEHOLDERS};

/// Split raw completion text into sections on blank-line boundaries.
///
/// A string with `k` separators yields exactly `k + 1` sections; the empty
/// string yields zero sections. Empty sections between consecutive
/// separators are kept so the count invariant holds.
pub fn split_sections(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split("\n\n").map(str::to_string).collect()
}

/// Replace every occurrence of each key with its value, in map order.
///
/// Matching is plain substring replacement, not whole-word: a key occurring
/// inside a longer word is still replaced. That mirrors the constrained
/// template vocabulary this service generates against.
pub fn substitute(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (key, value) in pairs {
        out = out.replace(key, value);
    }
    out
}

/// Apply the abbreviation and placeholder tables to every section.
pub fn apply_substitutions(sections: &mut [String]) {
    for section in sections.iter_mut() {
        *section = substitute(section, &ABBREVIATIONS);
        *section = substitute(section, &PLACEHOLDERS);
    }
}
