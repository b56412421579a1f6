//! Typed attribute bag for a single remote entity

use super::kind::ModelKind;
use super::value::{scalar_to_string, Value, TYPE_KEY};
use crate::error::{Error, Result};
use crate::query::property::capitalize;
use crate::query::Relation;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// One remote entity instance.
///
/// Attribute names are stored with a capitalized first letter and looked up
/// case-insensitively, so `set("foo", ..)` and `get("FOO")` address the same
/// `Foo` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectModel {
    kind: ModelKind,
    attributes: Vec<(String, Value)>,
}

impl ObjectModel {
    /// Create an empty model
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    /// Create a model from raw attributes (a `$type` key is ignored)
    pub fn with_attributes(kind: ModelKind, attributes: Map<String, JsonValue>) -> Self {
        let mut model = Self::new(kind);
        for (key, value) in attributes {
            if key != TYPE_KEY {
                model.set(&key, Value::Raw(value));
            }
        }
        model
    }

    /// Build a model from a raw object carrying a registered `$type`
    pub fn from_json(raw: JsonValue) -> Result<Self> {
        let type_name = raw
            .get(TYPE_KEY)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        Value::promote(raw)
            .into_model()
            .ok_or_else(|| Error::undefined_model(type_name))
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// The remote `$type` string
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Singular short name
    pub fn om(&self) -> &'static str {
        self.kind.om()
    }

    /// Plural short name
    pub fn oms(&self) -> String {
        self.kind.oms()
    }

    /// The `Code` attribute, or `Id` when there is no `Code` key. A `Code`
    /// that is present but not a scalar (null, object) yields `None`.
    pub fn code(&self) -> Option<String> {
        let value = self.get("Code").or_else(|| self.get("Id"))?;
        value.as_raw().and_then(scalar_to_string)
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Read an attribute as stored. Nested typed data stays raw here; use
    /// `resolve` or `get_model` to promote it to a model and memoize it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|idx| &self.attributes[idx].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.position(name).map(|idx| &mut self.attributes[idx].1)
    }

    /// Read an attribute, promoting raw typed data to models first. The
    /// promoted value replaces the raw one.
    pub fn resolve(&mut self, name: &str) -> Option<&Value> {
        let idx = self.position(name)?;
        let slot = &mut self.attributes[idx].1;
        slot.materialize();
        Some(&*slot)
    }

    /// Shorthand for `resolve(name)` narrowed to a nested model
    pub fn get_model(&mut self, name: &str) -> Option<&ObjectModel> {
        self.resolve(name).and_then(Value::as_model)
    }

    /// Mutable access to a nested model, promoting it if needed
    pub fn get_model_mut(&mut self, name: &str) -> Option<&mut ObjectModel> {
        let idx = self.position(name)?;
        let slot = &mut self.attributes[idx].1;
        slot.materialize();
        slot.as_model_mut()
    }

    /// Write an attribute, reusing an existing slot whatever its casing
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.position(name) {
            Some(idx) => self.attributes[idx].1 = value,
            None => self.attributes.push((normalize(name), value)),
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.position(name).map(|idx| self.attributes.remove(idx).1)
    }

    /// Attribute names and values, in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Deep-merge another model's attributes into this one
    pub fn merge(&mut self, other: ObjectModel) {
        for (key, value) in other.attributes {
            self.merge_attribute(&key, value);
        }
    }

    /// Deep-merge raw attributes into this model
    pub fn merge_map(&mut self, map: Map<String, JsonValue>) {
        for (key, value) in map {
            if key != TYPE_KEY {
                self.merge_attribute(&key, Value::Raw(value));
            }
        }
    }

    /// Deep-merge a model or a raw object. Other values are rejected.
    pub fn merge_value(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Model(other) => {
                self.merge(other);
                Ok(())
            }
            Value::Raw(JsonValue::Object(map)) => {
                self.merge_map(map);
                Ok(())
            }
            _ => Err(Error::invalid_argument(
                "Only object models or mappings can be merged into a model",
            )),
        }
    }

    fn merge_attribute(&mut self, key: &str, value: Value) {
        match self.get_mut(key) {
            Some(slot) => slot.merge(value),
            None => {
                self.attributes.push((normalize(key), value));
            }
        }
    }

    /// Start an ad-hoc relation from this model to another entity
    pub fn relates_to(&self, target: ModelKind) -> Relation {
        Relation::new(self.kind, target, None)
    }

    /// Resolve a declared relation by name
    pub fn relation(&self, name: &str) -> Result<Relation> {
        Relation::named(self.kind, name)
    }

    /// The first declared relation targeting the given model's entity
    pub fn relation_for(&self, model: &ObjectModel) -> Option<Relation> {
        self.kind
            .relation_for(model.kind())
            .and_then(|def| Relation::declared(self.kind, def).ok())
    }

    /// Serialize into `{"$type": ..., ...attributes}`
    pub fn into_json(self) -> JsonValue {
        let mut map = Map::new();
        map.insert(
            TYPE_KEY.to_string(),
            JsonValue::String(self.type_name().to_string()),
        );
        for (key, value) in self.attributes {
            map.insert(key, value.into_json());
        }
        JsonValue::Object(map)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let normalized = normalize(name);
        self.attributes
            .iter()
            .position(|(key, _)| *key == normalized)
            .or_else(|| {
                self.attributes
                    .iter()
                    .position(|(key, _)| key.eq_ignore_ascii_case(name.trim()))
            })
    }
}

impl Serialize for ObjectModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 1))?;
        map.serialize_entry(TYPE_KEY, self.type_name())?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl TryFrom<JsonValue> for ObjectModel {
    type Error = Error;

    fn try_from(raw: JsonValue) -> Result<Self> {
        Self::from_json(raw)
    }
}

fn normalize(name: &str) -> String {
    capitalize(name.trim())
}
