//! JSON request bodies.

use serde::Serialize;

use crate::error::{Error, Result};

/// Serialize `data` into a JSON request body.
pub fn encode_json<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(Error::Serialize)
}

/// Like [`encode_json`], but panics if `data` cannot be serialized.
///
/// Only use this where serialization cannot fail, e.g. for maps with string
/// keys and plain values.
pub fn must_encode_json<T: Serialize + ?Sized>(data: &T) -> Vec<u8> {
    match encode_json(data) {
        Ok(body) => body,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn encodes_nested_maps() {
        let body = encode_json(&serde_json::json!({ "msg": "ping", "nested": { "msg": "pong" } })).unwrap();
        let back: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(back["nested"]["msg"], "pong");
    }

    #[test]
    fn non_string_map_keys_fail() {
        let mut data = BTreeMap::new();
        data.insert(vec![1u8], "value");
        let err = encode_json(&data).unwrap_err();
        assert!(matches!(err, Error::Serialize(_)));
    }

    #[test]
    #[should_panic(expected = "serialization failed")]
    fn must_variant_panics_on_failure() {
        let mut data = BTreeMap::new();
        data.insert(vec![1u8], "value");
        must_encode_json(&data);
    }

    #[test]
    fn must_variant_returns_body() {
        assert_eq!(must_encode_json(&serde_json::json!({ "a": 1 })), br#"{"a":1}"#);
    }
}
