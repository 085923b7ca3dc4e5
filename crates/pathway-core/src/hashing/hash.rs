//! Helpers de hash: blake3 sobre texto o sobre JSON canonicalizado.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un valor JSON por su forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_stable_under_key_order() {
        let a = hash_value(&json!({"x": 1, "y": 2}));
        let b = hash_value(&json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_for_different_payloads() {
        assert_ne!(hash_value(&json!({"x": 1})), hash_value(&json!({"x": 2})));
    }
}
