//! Content fingerprinting for payload-level change detection.
//!
//! The digest covers a canonical encoding of the decoded JSON: object keys
//! sorted, every string and container length-prefixed. Whitespace and key
//! order on the wire therefore never register as a change.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(value: &Value) -> Self {
        let mut hasher = Sha256::new();
        feed(&mut hasher, value);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

fn feed(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(true) => hasher.update(b"t"),
        Value::Bool(false) => hasher.update(b"f"),
        Value::Number(n) => {
            hasher.update(b"#");
            feed_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update(b"s");
            feed_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update(b"[");
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                feed(hasher, item);
            }
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            hasher.update(b"{");
            hasher.update((entries.len() as u64).to_le_bytes());
            for (key, val) in entries {
                feed_str(hasher, key);
                feed(hasher, val);
            }
        }
    }
}

fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Result of comparing a payload against the last committed fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub is_real_change: bool,
    /// No fingerprint had been committed yet.
    pub is_first: bool,
    pub fingerprint: Fingerprint,
}

/// Holds the single current fingerprint. `evaluate` is pure; state only
/// moves on `commit`.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<Fingerprint>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Fingerprint> {
        self.last
    }

    pub fn evaluate(&self, payload: &Value) -> Evaluation {
        let fingerprint = Fingerprint::of(payload);
        Evaluation {
            is_real_change: self.last != Some(fingerprint),
            is_first: self.last.is_none(),
            fingerprint,
        }
    }

    pub fn commit(&mut self, evaluation: &Evaluation) {
        self.last = Some(evaluation.fingerprint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_ignores_key_order_and_whitespace() {
        let a: Value = serde_json::from_str(
            r#"{"incidents":[{"id":"1","status":"investigating"}],"components":[]}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            "{ \"components\" : [ ],\n  \"incidents\": [ {\"status\": \"investigating\", \"id\": \"1\"} ] }",
        )
        .unwrap();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&a));
    }

    #[test]
    fn test_fingerprint_sees_value_changes() {
        let a = json!({"components": [{"id": "c1", "status": "operational"}]});
        let b = json!({"components": [{"id": "c1", "status": "major_outage"}]});
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_array_order_matters() {
        let a = json!({"incidents": ["a", "b"]});
        let b = json!({"incidents": ["b", "a"]});
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_is_unambiguous_across_nesting() {
        // Same characters, different structure
        let a = json!({"a": "bc"});
        let b = json!({"ab": "c"});
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
        assert_ne!(Fingerprint::of(&json!(["1"])), Fingerprint::of(&json!([1])));
    }

    #[test]
    fn test_hex_is_64_chars() {
        let hex = Fingerprint::of(&json!({})).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_first_observation_is_real_change() {
        let detector = ChangeDetector::new();
        let eval = detector.evaluate(&json!({"incidents": []}));
        assert!(eval.is_real_change);
        assert!(eval.is_first);
    }

    #[test]
    fn test_same_payload_twice_is_noop() {
        let mut detector = ChangeDetector::new();
        let payload = json!({"incidents": [], "components": []});

        let first = detector.evaluate(&payload);
        detector.commit(&first);

        let second = detector.evaluate(&payload);
        assert!(!second.is_real_change);
        assert!(!second.is_first);
        assert_eq!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn test_evaluate_without_commit_leaves_state() {
        let mut detector = ChangeDetector::new();
        let base = json!({"v": 1});
        let eval = detector.evaluate(&base);
        detector.commit(&eval);

        let changed = json!({"v": 2});
        assert!(detector.evaluate(&changed).is_real_change);
        // Evaluating again is idempotent until committed
        assert!(detector.evaluate(&changed).is_real_change);
        assert_eq!(detector.current(), Some(eval.fingerprint));
    }
}
