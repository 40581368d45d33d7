use serde_json::Value;

/// Turn a decoded payload of unknown shape into the sequence of records to aggregate.
///
/// An `items` array inside an object wins, then a bare array; anything else becomes a
/// single-element batch. Never fails.
pub fn normalize(payload: Value) -> Vec<Value> {
    match payload {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("items".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        Value::Array(items) => items,
        other => vec![other],
    }
}
