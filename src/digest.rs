//! Content digests for change detection.
//!
//! Digests are SHA256 over the JSON serialization of the raw upstream
//! entity. `serde_json::Value` objects keep their keys sorted, so the same
//! upstream payload always serializes to the same bytes regardless of the
//! order the API returned the fields in.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the content digest of a raw entity.
///
/// Returns 64 lowercase hex characters.
#[must_use]
pub fn content_digest(raw: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute the digest of raw bytes (downloaded media).
#[must_use]
pub fn bytes_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_digest_deterministic() {
        let raw = json!({"id": "card_1", "name": "Card"});

        let hash1 = content_digest(&raw);
        let hash2 = content_digest(&raw);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_digest_ignores_field_order() {
        let a: Value = serde_json::from_str(r#"{"id":"x","name":"A"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"name":"A","id":"x"}"#).unwrap();

        assert_eq!(content_digest(&a), content_digest(&b));
    }

    #[test]
    fn test_content_digest_changes_with_content() {
        let a = json!({"id": "x", "name": "A"});
        let b = json!({"id": "x", "name": "B"});

        assert_ne!(content_digest(&a), content_digest(&b));
    }

    #[test]
    fn test_bytes_digest() {
        assert_eq!(
            bytes_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
