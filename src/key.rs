//! Cache key derivation
//!
//! A cache key is the resource identifier joined to the canonical JSON
//! rendering of the request parameters: `{resource}::{params}`. The
//! canonical form sorts object keys at every nesting level (arrays keep
//! their element order), so two logically identical parameter sets
//! always produce the same key no matter how their maps were built.
//! Keys stay human-readable on purpose - they are surfaced verbatim by
//! the cache stats endpoint for debugging.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Separator between the resource identifier and the parameter encoding.
///
/// Resource identifiers are URL paths and never contain `::`.
pub const KEY_SEPARATOR: &str = "::";

/// Derive the cache key for a request.
///
/// `None` parameters and parameters that serialize to JSON `null` both
/// read as "no parameters" and produce the same key as an empty map.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] when the parameter structure cannot
/// be serialized - a malformed parameter set must fail loudly here
/// rather than silently collide on a degenerate key.
pub fn derive_key<P: Serialize>(resource: &str, params: Option<&P>) -> Result<String> {
    let value = match params {
        Some(p) => serde_json::to_value(p)
            .map_err(|e| Error::InvalidParams(format!("parameters are not serializable: {e}")))?,
        None => Value::Object(Map::new()),
    };
    let value = if value.is_null() {
        Value::Object(Map::new())
    } else {
        value
    };

    let encoded = serde_json::to_string(&canonicalize(value))?;
    Ok(format!("{resource}{KEY_SEPARATOR}{encoded}"))
}

/// Rebuild a JSON value with object keys sorted at every nesting level.
///
/// serde_json's default map type already iterates in key order, but that
/// is a feature-dependent detail (`preserve_order` flips it); sorting
/// explicitly keeps the key encoding stable under any feature set.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_params_same_key() {
        let k1 = derive_key("analytics/orders", Some(&json!({"zone": "north", "page": 2}))).unwrap();
        let k2 = derive_key("analytics/orders", Some(&json!({"zone": "north", "page": 2}))).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn key_ignores_map_insertion_order() {
        let k1 = derive_key("analytics/orders", Some(&json!({"a": 1, "b": 2}))).unwrap();
        let k2 = derive_key("analytics/orders", Some(&json!({"b": 2, "a": 1}))).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn key_ignores_map_order_at_every_nesting_level() {
        let k1 = derive_key(
            "analytics/shipments",
            Some(&json!({"filters": {"zones": ["A", "B"], "courier": []}, "range": {"from": "2026-01-01", "to": "2026-01-31"}})),
        )
        .unwrap();
        let k2 = derive_key(
            "analytics/shipments",
            Some(&json!({"range": {"to": "2026-01-31", "from": "2026-01-01"}, "filters": {"courier": [], "zones": ["A", "B"]}})),
        )
        .unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn zones_courier_order_scenario() {
        // {zones:["A","B"], courier:[]} and {courier:[], zones:["A","B"]}
        // must collapse to one key for the same resource.
        let k1 = derive_key("analytics/courier", Some(&json!({"zones": ["A", "B"], "courier": []}))).unwrap();
        let k2 = derive_key("analytics/courier", Some(&json!({"courier": [], "zones": ["A", "B"]}))).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn differing_values_differ() {
        let k1 = derive_key("analytics/orders", Some(&json!({"zone": "north"}))).unwrap();
        let k2 = derive_key("analytics/orders", Some(&json!({"zone": "south"}))).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn differing_resources_differ() {
        let k1 = derive_key("analytics/orders", Some(&json!({"zone": "north"}))).unwrap();
        let k2 = derive_key("analytics/rto", Some(&json!({"zone": "north"}))).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn array_order_is_significant() {
        let k1 = derive_key("analytics/ndr", Some(&json!({"zones": ["A", "B"]}))).unwrap();
        let k2 = derive_key("analytics/ndr", Some(&json!({"zones": ["B", "A"]}))).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn absent_null_and_empty_params_share_a_key() {
        let absent = derive_key::<Value>("analytics/delays", None).unwrap();
        let null = derive_key("analytics/delays", Some(&Value::Null)).unwrap();
        let empty = derive_key("analytics/delays", Some(&json!({}))).unwrap();
        assert_eq!(absent, "analytics/delays::{}");
        assert_eq!(absent, null);
        assert_eq!(absent, empty);
    }

    #[test]
    fn unserializable_params_fail_fast() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cyclic structure"))
            }
        }

        let err = derive_key("analytics/orders", Some(&Broken)).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)), "got {err:?}");
    }

    #[test]
    fn canonicalize_sorts_nested_objects() {
        let canonical = canonicalize(json!({"b": {"y": 1, "x": 2}, "a": [{"q": 1, "p": 2}]}));
        assert_eq!(
            serde_json::to_string(&canonical).unwrap(),
            r#"{"a":[{"p":2,"q":1}],"b":{"x":2,"y":1}}"#
        );
    }
}
