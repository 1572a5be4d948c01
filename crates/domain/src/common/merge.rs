//! Recursive merge of partial updates into JSON documents.

use serde_json::{Map, Value};

/// Merge `source` into a copy of `target`.
///
/// For each key of `source`: when both sides hold objects the merge recurses,
/// otherwise the source value replaces the target value wholesale. Sequences
/// are never merged element-wise, so list sections must be sent complete.
/// A non-object `source` has no keys, so `target` comes back unchanged.
///
/// # Examples
///
/// ```
/// use rpgtrack_domain::common::deep_merge;
/// use serde_json::json;
///
/// let target = json!({ "a": { "x": 1, "y": 2 }, "list": [1, 2] });
/// let source = json!({ "a": { "y": 9 }, "list": [3] });
/// assert_eq!(
///     deep_merge(&target, &source),
///     json!({ "a": { "x": 1, "y": 9 }, "list": [3] })
/// );
/// ```
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            let mut merged = target_map.clone();
            for (key, source_value) in source_map {
                let next = match merged.get(key) {
                    Some(target_value) if target_value.is_object() && source_value.is_object() => {
                        deep_merge(target_value, source_value)
                    }
                    _ => source_value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, Value::Object(_)) => source.clone(),
        _ => target.clone(),
    }
}

/// Apply the changes between `view` and `edited` onto `stored`.
///
/// `view` is what a reader was shown of `stored` (a schema-shaped projection
/// that may omit or default parts of it) and `edited` is the reader's
/// modified copy of that view. Wherever `edited` still equals `view` the
/// stored value is kept verbatim, so data the projection could not represent
/// survives. Keys present in `stored` but absent from `view` were never shown
/// and are kept; keys the reader removed from the view are dropped.
///
/// # Examples
///
/// ```
/// use rpgtrack_domain::common::reconcile_edits;
/// use serde_json::json;
///
/// let stored = json!({ "hp": { "current": 5, "temp": 3 }, "level": 1 });
/// let view = json!({ "hp": { "current": 5 }, "level": 1 });
/// let edited = json!({ "hp": { "current": 5 }, "level": 2 });
/// assert_eq!(
///     reconcile_edits(&stored, &view, &edited),
///     json!({ "hp": { "current": 5, "temp": 3 }, "level": 2 })
/// );
/// ```
pub fn reconcile_edits(stored: &Value, view: &Value, edited: &Value) -> Value {
    if edited == view {
        return stored.clone();
    }

    let (Value::Object(stored_map), Value::Object(view_map), Value::Object(edited_map)) =
        (stored, view, edited)
    else {
        return edited.clone();
    };

    let mut result = Map::new();
    for (key, stored_value) in stored_map {
        if !view_map.contains_key(key) && !edited_map.contains_key(key) {
            result.insert(key.clone(), stored_value.clone());
        }
    }
    for (key, edited_value) in edited_map {
        let next = match (stored_map.get(key), view_map.get(key)) {
            (Some(stored_value), Some(view_value)) => {
                reconcile_edits(stored_value, view_value, edited_value)
            }
            _ => edited_value.clone(),
        };
        result.insert(key.clone(), next);
    }
    Value::Object(result)
}
