//! Internal helpers for parsing and normalization.
//!
//! These utilities are **not** part of the public API. They centralize the
//! conversions the engine relies on for consistent lookups and dedup checks.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Canonical form of an email address for uniqueness checks: NFKC-normalized,
/// trimmed, lowercased.
pub(crate) fn normalize_email(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_canonicalizes() {
        assert_eq!(normalize_email("  Mario@Example.COM "), "mario@example.com");
        // NFKC folds compatibility forms (fullwidth letters).
        assert_eq!(normalize_email("ｍａｒｉｏ@example.com"), "mario@example.com");
    }

    #[test]
    fn parse_uuid_labels_errors() {
        let err = parse_uuid("nope", "group").unwrap_err();
        assert_eq!(err, EngineError::InvalidId("invalid group id".to_string()));
    }
}
