//! Identifier derivation
//!
//! Identifiers are URL-safe slugs: compatibility-decomposed, reduced to ASCII,
//! lower-cased, with every run of other characters collapsed to a single `-`.
//! They are deterministic but not unique; the record cache detects collisions.

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Separator placed between alphanumeric runs
pub const SEPARATOR: char = '-';

/// Prefix of the identifier assigned when no source text yields a slug
pub const FALLBACK_PREFIX: &str = "unidentified";

/// Derive a slug from arbitrary text
///
/// Returns `None` for empty input and for input with no transliterable
/// alphanumerics (e.g. a title written only in CJK characters).
pub fn derive(text: &str) -> Option<String> {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    (!slug.is_empty()).then_some(slug)
}

/// Derive from the first candidate that yields a slug
pub fn derive_first<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find_map(derive)
}

/// Deterministic last-resort identifier for a file
///
/// `unidentified-<8 hex chars of SHA-256(filename)>`
pub fn fallback_for(filename: &str) -> String {
    let hash = format!("{:x}", Sha256::digest(filename.as_bytes()));
    format!("{}{}{}", FALLBACK_PREFIX, SEPARATOR, &hash[..8])
}

/// True if `id` has the shape `derive` produces
pub fn is_valid(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with(SEPARATOR)
        && !id.ends_with(SEPARATOR)
        && !id.contains("--")
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR)
}
