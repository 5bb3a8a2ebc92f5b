//! JSON value helpers used by the configuration layers.

use serde_json::Value;

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay_val) => overlay_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_overlay_wins() {
        let base = json!({"domain": "a", "nested": {"x": 1, "y": 2}});
        let overlay = json!({"domain": "b", "nested": {"y": 3}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"domain": "b", "nested": {"x": 1, "y": 3}})
        );
    }

    #[test]
    fn test_deep_merge_scalar_replaces_object() {
        assert_eq!(deep_merge(json!({"a": {"b": 1}}), json!({"a": 5})), json!({"a": 5}));
    }
}
