//! Attribute values
//!
//! API responses are decoded as plain JSON first. Nested objects that carry
//! a known `$type` are only turned into `ObjectModel`s when they are
//! accessed through `ObjectModel::resolve`, and the result is stored back.

use super::kind::ModelKind;
use super::object::ObjectModel;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Key carrying the entity type in API payloads
pub const TYPE_KEY: &str = "$type";

/// A record or attribute value: raw JSON, a typed model, or a list of values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Raw(JsonValue),
    Model(ObjectModel),
    List(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Raw(JsonValue::Null)
    }
}

impl Value {
    /// Promote raw data to a typed model when it carries a registered
    /// `$type`. Anything else is passed through untouched.
    pub fn promote(raw: JsonValue) -> Self {
        match raw {
            JsonValue::Object(map) => match kind_of(&map) {
                Some(kind) => Value::Model(ObjectModel::with_attributes(kind, map)),
                None => Value::Raw(JsonValue::Object(map)),
            },
            other => Value::Raw(other),
        }
    }

    /// Promote this value in place, one level deep
    pub(crate) fn materialize(&mut self) {
        let Value::Raw(raw) = self else {
            return;
        };

        match raw {
            JsonValue::Object(map) if kind_of(map).is_some() => {
                let raw = std::mem::take(raw);
                *self = Value::promote(raw);
            }
            JsonValue::Array(items) if items.iter().any(is_typed_object) => {
                let items = std::mem::take(items);
                *self = Value::List(items.into_iter().map(Value::promote).collect());
            }
            _ => {}
        }
    }

    /// Deep-merge `incoming` into this value. Objects and models merge key
    /// by key; lists and scalars are replaced wholesale.
    pub fn merge(&mut self, incoming: Value) {
        match incoming {
            Value::Model(other) => match self {
                Value::Model(target) => target.merge(other),
                Value::Raw(JsonValue::Object(map)) => {
                    let mut merged = ObjectModel::with_attributes(other.kind(), std::mem::take(map));
                    merged.merge(other);
                    *self = Value::Model(merged);
                }
                _ => *self = Value::Model(other),
            },
            Value::Raw(JsonValue::Object(incoming)) => match self {
                Value::Model(target) => target.merge_map(incoming),
                Value::Raw(JsonValue::Object(target)) => merge_objects(target, incoming),
                _ => *self = Value::Raw(JsonValue::Object(incoming)),
            },
            other => *self = other,
        }
    }

    pub fn as_model(&self) -> Option<&ObjectModel> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_model_mut(&mut self) -> Option<&mut ObjectModel> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<ObjectModel> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&JsonValue> {
        match self {
            Value::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    /// Raw string content, if this is a JSON string
    pub fn as_str(&self) -> Option<&str> {
        self.as_raw().and_then(JsonValue::as_str)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Number of elements for lists (raw or promoted)
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Raw(JsonValue::Array(items)) => Some(items.len()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Raw(JsonValue::Null))
    }

    /// Convert back into plain JSON (models regain their `$type`)
    pub fn into_json(self) -> JsonValue {
        match self {
            Value::Raw(raw) => raw,
            Value::Model(model) => model.into_json(),
            Value::List(items) => JsonValue::Array(items.into_iter().map(Value::into_json).collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Raw(raw) => raw.serialize(serializer),
            Value::Model(model) => model.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(raw: JsonValue) -> Self {
        Value::Raw(raw)
    }
}

impl From<ObjectModel> for Value {
    fn from(model: ObjectModel) -> Self {
        Value::Model(model)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Raw(JsonValue::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Raw(JsonValue::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Raw(JsonValue::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Raw(JsonValue::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Raw(JsonValue::Bool(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Entity designated by the `$type` key of a raw object
fn kind_of(map: &Map<String, JsonValue>) -> Option<ModelKind> {
    map.get(TYPE_KEY)
        .and_then(JsonValue::as_str)
        .and_then(ModelKind::from_type)
}

fn is_typed_object(value: &JsonValue) -> bool {
    value.as_object().is_some_and(|map| kind_of(map).is_some())
}

/// Recursive merge of raw objects; arrays and scalars are overwritten
fn merge_objects(target: &mut Map<String, JsonValue>, incoming: Map<String, JsonValue>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(JsonValue::Object(existing)), JsonValue::Object(value)) => {
                merge_objects(existing, value);
            }
            (Some(slot), value) => *slot = value,
            (None, value) => {
                target.insert(key, value);
            }
        }
    }
}

pub(crate) fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
