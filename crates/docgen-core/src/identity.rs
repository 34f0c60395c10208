//! Deterministic document identity
//!
//! A generated document is addressed by a short digest of the caller-supplied
//! payload (before any verification fields are injected). Identical payloads
//! map to the same id regardless of key insertion order, which makes
//! re-verification idempotent. The id is a convenience handle, not a
//! uniqueness guarantee: two distinct payloads could collide, and a collision
//! silently overwrites the stored artifact.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of a document id in hex characters.
pub const DOCUMENT_ID_LEN: usize = 12;

/// Derive the content-addressed id for a payload.
///
/// SHA-256 over the canonical JSON serialization, hex-encoded and truncated
/// to [`DOCUMENT_ID_LEN`] characters.
pub fn derive_document_id(payload: &Value) -> String {
    let digest = Sha256::digest(canonical_json(payload).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(DOCUMENT_ID_LEN);
    id
}

/// True iff `id` has the exact shape produced by [`derive_document_id`]:
/// 12 lowercase hex characters. Anything else is rejected before it can
/// reach the document store.
pub fn is_valid_document_id(id: &str) -> bool {
    id.len() == DOCUMENT_ID_LEN && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Canonical JSON serialization: compact, with object keys recursively
/// sorted. Two JSON values that are structurally equal serialize to the
/// same string.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                // Value's Display impl handles JSON string escaping.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&fields[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        leaf => out.push_str(&leaf.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_form_sorts_keys_recursively() {
        let value = json!({
            "b": 1,
            "a": { "z": true, "m": [null, "x"] }
        });
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"m":[null,"x"],"z":true},"b":1}"#
        );
    }

    #[test]
    fn canonical_form_escapes_strings() {
        let value = json!({ "note": "line\n\"quoted\"" });
        assert_eq!(
            canonical_json(&value),
            r#"{"note":"line\n\"quoted\""}"#
        );
    }

    #[test]
    fn ids_are_twelve_lowercase_hex_chars() {
        let id = derive_document_id(&json!({ "name": "Test User" }));
        assert_eq!(id.len(), DOCUMENT_ID_LEN);
        assert!(is_valid_document_id(&id));
    }

    #[test]
    fn identical_payloads_share_an_id() {
        let a: Value = serde_json::from_str(r#"{"name":"x","amount":10}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"amount":10,"name":"x"}"#).unwrap();
        assert_eq!(derive_document_id(&a), derive_document_id(&b));
    }

    #[test]
    fn a_single_differing_value_changes_the_id() {
        let a = json!({ "name": "x", "amount": 10 });
        let b = json!({ "name": "x", "amount": 11 });
        assert_ne!(derive_document_id(&a), derive_document_id(&b));
    }

    #[test]
    fn derivation_handles_non_object_payloads() {
        assert_eq!(derive_document_id(&Value::Null).len(), DOCUMENT_ID_LEN);
        assert_eq!(derive_document_id(&json!([1, 2, 3])).len(), DOCUMENT_ID_LEN);
    }

    #[test]
    fn id_validation_rejects_malformed_input() {
        assert!(!is_valid_document_id(""));
        assert!(!is_valid_document_id("abc"));
        assert!(!is_valid_document_id("ABCDEF012345"));
        assert!(!is_valid_document_id("../secret.pdf"));
        assert!(!is_valid_document_id("0123456789abc"));
    }
}
