//! Business name normalization
//!
//! Strips legal-entity and generic category words ("LLC", "Coffee", ...) and
//! punctuation so "Joe's Coffee Shop, LLC" and "Joe's" compare as the same name.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// SUFFIX PATTERNS
// =============================================================================

/// Legal-entity forms
static LEGAL_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(LLC|Inc|Corp|Corporation|Company|Co|Ltd|Limited|LP|LLP)\b").unwrap()
});

/// Venue/category words
static CATEGORY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Restaurant|Cafe|Coffee|Shop|Store|Market|Center|Centre)\b").unwrap()
});

/// Professional-services words
static SERVICE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Services|Service|Group|Associates|Solutions)\b").unwrap()
});

static PUNCTUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a business name for comparison.
///
/// Removes suffix vocabulary case-insensitively, replaces punctuation with
/// spaces, collapses whitespace runs and trims. Idempotent.
pub fn normalize_name(name: &str) -> String {
    let mut cleaned = name.to_string();
    for re in [&*LEGAL_SUFFIX_RE, &*CATEGORY_SUFFIX_RE, &*SERVICE_SUFFIX_RE] {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = PUNCTUATION_RE.replace_all(&cleaned, " ");
    WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
}
