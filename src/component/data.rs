//! The payload wrapper passed between component ports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::utils::MetadataSource;

/// A JSON-object payload, as exchanged with the workflow host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Data {
    pub data: Map<String, Value>,
}

impl Data {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(Error::InvalidArgument(format!(
                "Data payload must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Serialize any value into a payload.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Wrap a single value under `key`.
    pub fn single(key: impl Into<String>, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.into(), value);
        Self { data }
    }

    /// Insert a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Deserialize the payload into a typed value.
    pub fn to_typed<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    /// Unwrap into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<Map<String, Value>> for Data {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl MetadataSource for Data {
    fn metadata_value(&self) -> Option<&Value> {
        self.data.get("metadata")
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ensure_metadata_dict;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(Data::from_value(json!({"a": 1})).is_ok());
        let err = Data::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_transparent_serialization() {
        let data = Data::new().with("text", "hi");
        assert_eq!(serde_json::to_value(&data).unwrap(), json!({"text": "hi"}));
    }

    #[test]
    fn test_metadata_from_data_wrapper() {
        let data = Data::from_value(json!({"metadata": {"page": 2}})).unwrap();
        assert_eq!(ensure_metadata_dict(&data).get("page"), Some(&json!(2)));
        assert!(ensure_metadata_dict(&Data::new().with("text", "hi")).is_empty());
    }
}
