use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `record` keeping only the named top-level fields.
pub fn project<T: Serialize>(record: &T, fields: &[&str]) -> Result<Value, serde_json::Error> {
    let value = serde_json::to_value(record)?;
    let Value::Object(map) = value else {
        return Ok(value);
    };

    let projected: Map<String, Value> = map
        .into_iter()
        .filter(|(key, _)| fields.contains(&key.as_str()))
        .collect();
    Ok(Value::Object(projected))
}

pub fn project_all<T: Serialize>(
    records: &[T],
    fields: &[&str],
) -> Result<Vec<Value>, serde_json::Error> {
    records.iter().map(|r| project(r, fields)).collect()
}
