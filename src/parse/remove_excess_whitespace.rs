use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

/// Collapses every whitespace run to a single space and trims both ends.
pub fn remove_excess_whitespace(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\s+").expect("regex should be valid"));
    let out: Cow<'_, str> = Regex::replace_all(re, s.trim(), " ");
    out
}
