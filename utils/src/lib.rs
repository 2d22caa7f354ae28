//! # Stratus Utilities
//!
//! Content fingerprinting and identifier helpers shared by the resolver and
//! the refresh coordinator.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of content string
///
/// # Examples
///
/// ```
/// use utils::compute_content_hash;
///
/// let hash = compute_content_hash("hello world");
/// assert_eq!(hash.len(), 64);
/// ```
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint of a notified payload.
///
/// Empty or absent payloads have no fingerprint; they are never hashed as
/// the empty string.
///
/// ```
/// use utils::content_fingerprint;
///
/// assert!(content_fingerprint(None).is_none());
/// assert!(content_fingerprint(Some("")).is_none());
/// assert!(content_fingerprint(Some("a=1")).is_some());
/// ```
#[must_use]
pub fn content_fingerprint(content: Option<&str>) -> Option<String> {
    match content {
        Some(content) if !content.is_empty() => Some(compute_content_hash(content)),
        _ => None,
    }
}

/// True when `value` is absent or contains only whitespace.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Extension of a source identifier such as `redis.yaml`, if any.
///
/// ```
/// use utils::file_extension_of;
///
/// assert_eq!(file_extension_of("common.yaml"), Some("yaml"));
/// assert_eq!(file_extension_of("common"), None);
/// ```
#[must_use]
pub fn file_extension_of(identifier: &str) -> Option<&str> {
    let (stem, extension) = identifier.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compute_content_hash_consistency() {
        let content = "test content";
        let hash1 = compute_content_hash(content);
        let hash2 = compute_content_hash(content);
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_compute_content_hash_known_value() {
        assert_eq!(
            compute_content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_empty_is_none() {
        assert_eq!(content_fingerprint(Some("")), None);
        assert_eq!(content_fingerprint(None), None);
    }

    #[test]
    fn test_fingerprint_whitespace_is_hashed() {
        assert!(content_fingerprint(Some(" ")).is_some());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some("app")));
    }

    #[test]
    fn test_file_extension_of() {
        assert_eq!(file_extension_of("app.properties"), Some("properties"));
        assert_eq!(file_extension_of("a.b.json"), Some("json"));
        assert_eq!(file_extension_of(".hidden"), None);
        assert_eq!(file_extension_of("trailing."), None);
    }

    proptest! {
        #[test]
        fn prop_fingerprint_is_deterministic(content in ".{1,64}") {
            let first = content_fingerprint(Some(&content));
            let second = content_fingerprint(Some(&content));
            prop_assert!(first.is_some());
            prop_assert_eq!(first, second);
        }
    }
}
