use serde_json::Value;

/// Unset settings are `null` (a `None` field) or an empty string.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Removes object keys holding an unset value from the request and its
/// nested settings objects, so the server falls back to its own defaults.
/// Array entries are sent untouched: an empty `replace` string is data.
pub fn strip_unset(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|_, v| !is_unset(v));
        map.values_mut().for_each(strip_unset);
        map.retain(|_, v| !matches!(v, Value::Object(inner) if inner.is_empty()));
    }
}
