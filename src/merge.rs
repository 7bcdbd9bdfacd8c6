//! Deep merge of configuration mappings.
//!
//! Implements field-by-field merging where the right-hand operand wins.
//! Sequences and scalars are replaced entirely, never concatenated.

use crate::types::ConfigMap;
use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Mappings are merged recursively: keys in overlay override keys in base
/// - Everything else (sequences, strings, numbers, booleans, null) is replaced
///   entirely, regardless of the type it replaces
///
/// Both operands are taken by value, so the caller's copies are never touched.
///
/// # Example
/// ```
/// use serde_json::json;
/// use configtpl::merge::deep_merge;
///
/// let base = json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// });
/// let overlay = json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(
///     result,
///     json!({ "server": { "port": 9000, "host": "localhost" }, "features": ["c"] })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        (_, overlay) => overlay,
    }
}

/// Deep merge two mappings. Keys missing from `overlay` keep their `base` value.
pub fn merge_maps(mut base: ConfigMap, overlay: ConfigMap) -> ConfigMap {
    for (key, overlay_value) in overlay {
        let merged_value = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged_value);
    }
    base
}

/// Merge multiple mappings in order, with later mappings taking precedence.
///
/// Equivalent to folding `merge_maps` over the list. An empty list yields an
/// empty mapping.
pub fn deep_merge_all(maps: impl IntoIterator<Item = ConfigMap>) -> ConfigMap {
    maps.into_iter().fold(ConfigMap::new(), merge_maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a mapping, got {other}"),
        }
    }

    #[test]
    fn test_merge_empty() {
        assert_eq!(deep_merge_all(Vec::new()), ConfigMap::new());
        assert_eq!(merge_maps(ConfigMap::new(), ConfigMap::new()), ConfigMap::new());
        assert_eq!(
            merge_maps(ConfigMap::new(), map(json!({"a": 1}))),
            map(json!({"a": 1}))
        );
        assert_eq!(
            merge_maps(map(json!({"a": 1})), ConfigMap::new()),
            map(json!({"a": 1}))
        );
    }

    #[test]
    fn test_merge_simple_objects() {
        let base = json!({"a": 1, "b": 2});
        let overlay = json!({"b": 3, "c": 4});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_nested_objects() {
        let base = json!({"a": {"x": 1, "z": 5}, "b": 2});
        let overlay = json!({"a": {"y": 3, "z": 6}, "c": 4});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": {"x": 1, "y": 3, "z": 6}, "b": 2, "c": 4}));
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let base = json!({"x": [1, 2]});
        let overlay = json!({"x": [3]});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"x": [3]}));
    }

    #[test]
    fn test_null_overrides_base() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"a": null, "b": {"c": null}});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": null, "b": {"c": null}}));
    }

    #[test]
    fn test_deep_nested_merge() {
        let base = json!({"a": {"b": {"c": 1}}});
        let overlay = json!({"a": {"b": {"d": 2}}});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": {"b": {"c": 1, "d": 2}}}));
    }

    #[test]
    fn test_merge_all() {
        let maps = vec![
            map(json!({"a": 1, "b": {"x": 10}})),
            map(json!({"c": 3, "b": {"y": 20}})),
            map(json!({"a": 5, "d": 4, "b": {"z": 30}})),
        ];
        let result = deep_merge_all(maps);
        assert_eq!(
            result,
            map(json!({"a": 5, "b": {"x": 10, "y": 20, "z": 30}, "c": 3, "d": 4}))
        );
    }

    #[test]
    fn test_overlay_replaces_primitive_with_object() {
        let base = json!({"a": 10, "b": {"y": 20}});
        let overlay = json!({"a": {"x": 1}, "b": 2});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": {"x": 1}, "b": 2}));
    }

    #[test]
    fn test_overlay_replaces_object_with_primitive() {
        let base = json!({"a": {"x": 1}, "b": 2});
        let overlay = json!({"a": 10, "b": {"y": 20}});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": 10, "b": {"y": 20}}));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_map() -> impl Strategy<Value = ConfigMap> {
        prop::collection::btree_map("[a-d]", arb_value(), 0..4)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_fold_left_equivalence(a in arb_map(), b in arb_map(), c in arb_map()) {
            let nested = merge_maps(merge_maps(a.clone(), b.clone()), c.clone());
            let folded = deep_merge_all(vec![a, b, c]);
            prop_assert_eq!(nested, folded);
        }

        #[test]
        fn prop_right_bias_for_non_mappings(a in arb_map(), b in arb_map()) {
            let merged = merge_maps(a.clone(), b.clone());
            for (key, value) in &b {
                let both_maps = value.is_object() && a.get(key).is_some_and(Value::is_object);
                if !both_maps {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
            for (key, value) in &a {
                if !b.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
