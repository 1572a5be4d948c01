//! Dotted-path access into JSON documents.
//!
//! Paths are split on `.` and every segment is an object key. Numeric-looking
//! segments (`"spellSlots.1.used"`) are keys too, never sequence indices, and
//! empty segments address the empty-string key.

use serde_json::{Map, Value};

/// Read the value at `path`, or `None` when any segment is missing or the walk
/// reaches a non-object before the last segment.
///
/// # Examples
///
/// ```
/// use rpgtrack_domain::common::get_nested_value;
/// use serde_json::json;
///
/// let doc = json!({ "hp": { "current": 42 } });
/// assert_eq!(get_nested_value(&doc, "hp.current"), Some(&json!(42)));
/// assert_eq!(get_nested_value(&doc, "hp.current.deeper"), None);
/// assert_eq!(get_nested_value(&doc, "mp.current"), None);
/// ```
pub fn get_nested_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, key| current.as_object()?.get(key))
}

/// Assign `value` at `path`, creating intermediate objects as needed.
///
/// Any intermediate that is missing or not an object (scalars, sequences,
/// null) is overwritten with an empty object. A non-object root is treated the
/// same way. This never fails.
///
/// # Examples
///
/// ```
/// use rpgtrack_domain::common::set_nested_value;
/// use serde_json::json;
///
/// let mut doc = json!({ "hp": 5 });
/// set_nested_value(&mut doc, "hp.current", json!(10));
/// assert_eq!(doc, json!({ "hp": { "current": 10 } }));
/// ```
pub fn set_nested_value(doc: &mut Value, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    // split always yields at least one segment
    let last = segments.pop().unwrap_or_default();

    let Some(mut current) = ensure_object(doc) else {
        return;
    };
    for key in segments {
        let slot = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(next) = ensure_object(slot) else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

/// Replace a non-object with `{}` and hand back its map. Always `Some`.
fn ensure_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}
