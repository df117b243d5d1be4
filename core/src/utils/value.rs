// core/src/utils/value.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Key/value table used for templates, raw overrides and assembled jobs.
pub type Mapping = BTreeMap<String, Value>;

/// Leaf of a [`Value`] tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Loosely-typed tree value: the shape of job templates and raw job specs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(s.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Mirrors the truthiness the scheduler CLI has always applied to option
    /// values: null, false, zero, "" and empty collections count as unset.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Scalar(Scalar::Null) => false,
            Value::Scalar(Scalar::Bool(b)) => *b,
            Value::Scalar(Scalar::Int(i)) => *i != 0,
            Value::Scalar(Scalar::Float(f)) => *f != 0.0,
            Value::Scalar(Scalar::Str(s)) => !s.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(m) => !m.is_empty(),
        }
    }

    /// Recursively merges `overlay` onto `self`.
    ///
    /// Mappings are merged key by key; in every other case, including a type
    /// mismatch, the overlay replaces the base. Sequences are never merged
    /// element-wise.
    pub fn merge(&self, overlay: &Value) -> Value {
        match (self, overlay) {
            (Value::Mapping(base), Value::Mapping(over)) => Value::Mapping(merge(base, over)),
            _ => overlay.clone(),
        }
    }
}

/// Merges two mappings, `overlay` taking precedence on conflicting keys.
pub fn merge(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut merged = base.clone();
    for (key, over) in overlay {
        let value = match merged.get(key) {
            Some(existing) => existing.merge(over),
            None => over.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Scalar(Scalar::Null),
            Json::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Scalar(Scalar::Int(i)),
                None => Value::Scalar(Scalar::Float(n.as_f64().unwrap_or_default())),
            },
            Json::String(s) => Value::Scalar(Scalar::Str(s)),
            Json::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Json::Object(obj) => {
                Value::Mapping(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Value::Scalar(Scalar::Null) => Json::Null,
            Value::Scalar(Scalar::Bool(b)) => Json::Bool(*b),
            Value::Scalar(Scalar::Int(i)) => Json::from(*i),
            // Non-finite floats have no JSON form and become null.
            Value::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Scalar(Scalar::Str(s)) => Json::String(s.clone()),
            Value::Sequence(items) => Json::Array(items.iter().map(Json::from).collect()),
            Value::Mapping(m) => {
                Json::Object(m.iter().map(|(k, v)| (k.clone(), Json::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_merge_recurses_into_nested_mappings() {
        let base = value(json!({"a": 1, "b": {"x": 1}}));
        let over = value(json!({"b": {"y": 2}, "c": 3}));
        assert_eq!(base.merge(&over), value(json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3})));
    }

    #[test]
    fn test_merge_override_wins_on_type_change() {
        let base = value(json!({"a": 1, "b": {"x": 1}}));
        let over = value(json!({"a": [1, 2], "b": "flat"}));
        assert_eq!(base.merge(&over), value(json!({"a": [1, 2], "b": "flat"})));

        let base = value(json!({"a": [1, 2, 3]}));
        let over = value(json!({"a": {"k": true}}));
        assert_eq!(base.merge(&over), over);
    }

    #[test]
    fn test_merge_replaces_lists_wholesale() {
        let base = value(json!({"uris": [{"value": "a"}, {"value": "b"}]}));
        let over = value(json!({"uris": [{"extract": true}]}));
        assert_eq!(base.merge(&over), value(json!({"uris": [{"extract": true}]})));
    }

    #[test]
    fn test_merge_leaves_operands_untouched() {
        let base = value(json!({"env": {"A": "1"}}));
        let over = value(json!({"env": {"B": "2"}}));
        let _ = base.merge(&over);
        assert_eq!(base, value(json!({"env": {"A": "1"}})));
        assert_eq!(over, value(json!({"env": {"B": "2"}})));
    }

    #[test]
    fn test_json_conversion_keeps_number_kinds() {
        let original = json!({"cpus": 0.5, "mem": 128, "ok": null, "tags": ["a"]});
        let converted = value(original.clone());
        assert_eq!(serde_json::Value::from(&converted), original);
    }

    #[test]
    fn test_truthiness() {
        assert!(!value(json!("")).is_truthy());
        assert!(!value(json!(null)).is_truthy());
        assert!(!value(json!(0)).is_truthy());
        assert!(value(json!("x")).is_truthy());
        assert!(value(json!({"k": 1})).is_truthy());
    }
}
