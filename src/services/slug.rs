//! Alias (slug) generation
//!
//! Turns a human-readable title or name into a URL-safe alias: every run of
//! characters outside `[A-Za-z0-9-]` becomes a single hyphen, hyphens are
//! trimmed from both ends and the result is lowercased. Non-ASCII letters are
//! outside the allowed set, so `"Café"` becomes `"caf"`.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9-]+").expect("static slug pattern is valid"));

/// Derive an alias from free text. Total and idempotent.
pub fn slugify(input: &str) -> String {
    DISALLOWED_RUN
        .replace_all(input, "-")
        .trim_matches('-')
        .to_ascii_lowercase()
}
