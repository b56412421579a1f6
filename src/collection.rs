//! Result accumulation across continuation pages
//!
//! The API cuts large result sets into pages and may split a record across
//! two of them. The last record of a page is therefore held back as a
//! *fragment* while more pages are expected, and merged with the first
//! record of the next page when both share the same type and code.

use crate::model::Value;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Ordered results, plus at most one pending fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Value>,
    fragment: Option<Value>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of results.
    ///
    /// `incoming` may be a list (promoted or raw) or a single value.
    /// `expect_more` tells whether another page will follow.
    pub fn fill(&mut self, incoming: impl Into<Value>, expect_more: bool) -> &mut Self {
        let mut values = into_items(incoming.into());

        if self.completes_fragment(values.first()) {
            let part = values.remove(0);
            if let Some(fragment) = self.fragment.as_mut() {
                fragment.merge(part);
            }
        }

        if !values.is_empty() || !expect_more {
            if let Some(fragment) = self.fragment.take() {
                self.items.push(fragment);
            }
        }

        if self.fragment.is_none() && expect_more {
            self.fragment = values.pop();
        }

        self.items.extend(values);
        self
    }

    /// Whether `value` is the continuation of the pending fragment
    fn completes_fragment(&self, value: Option<&Value>) -> bool {
        let (Some(fragment), Some(value)) = (
            self.fragment.as_ref().and_then(Value::as_model),
            value.and_then(Value::as_model),
        ) else {
            return false;
        };

        fragment.kind() == value.kind()
            && fragment.code().is_some()
            && fragment.code() == value.code()
    }

    /// Every item, the pending fragment last
    pub fn all(&self) -> Vec<&Value> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().chain(self.fragment.iter())
    }

    /// Completed items plus the pending fragment, if any
    pub fn count(&self) -> usize {
        self.items.len() + usize::from(self.fragment.is_some())
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.first().or(self.fragment.as_ref())
    }

    /// The last completed item, or the fragment when nothing is completed
    pub fn last(&self) -> Option<&Value> {
        self.items.last().or(self.fragment.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.iter().nth(index)
    }

    /// The record held back for the next page
    pub fn fragment(&self) -> Option<&Value> {
        self.fragment.as_ref()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.into_iter().collect()
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Array(self.into_iter().map(Value::into_json).collect())
    }
}

/// Split a page into items. A null page (empty or non-200 body) holds none.
fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Raw(JsonValue::Null) => Vec::new(),
        Value::List(items) => items,
        Value::Raw(JsonValue::Array(items)) => items.into_iter().map(Value::Raw).collect(),
        other => vec![other],
    }
}

impl IntoIterator for Collection {
    type Item = Value;
    type IntoIter = std::iter::Chain<std::vec::IntoIter<Value>, std::option::IntoIter<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter().chain(self.fragment)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::iter::Chain<std::slice::Iter<'a, Value>, std::option::Iter<'a, Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().chain(self.fragment.iter())
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            fragment: None,
        }
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{to_model, ObjectModel};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CUSTOMER: &str = "Winbooks.TORM.OM.Customer, Winbooks.TORM.OM";

    fn customers(raw: JsonValue) -> Value {
        to_model(raw)
    }

    fn codes(collection: &Collection) -> Vec<String> {
        collection
            .iter()
            .filter_map(Value::as_model)
            .filter_map(ObjectModel::code)
            .collect()
    }

    #[test]
    fn test_fragment_is_completed_by_next_page() {
        let mut collection = Collection::new();

        collection.fill(
            customers(json!([
                {"$type": CUSTOMER, "Code": "1"},
                {"$type": CUSTOMER, "Code": "2", "Name": "Arthur"}
            ])),
            true,
        );

        assert_eq!(collection.items.len(), 1);
        assert_eq!(
            collection.fragment().and_then(Value::as_model).and_then(ObjectModel::code),
            Some("2".to_string())
        );
        assert_eq!(collection.count(), 2);

        collection.fill(
            customers(json!([
                {"$type": CUSTOMER, "Code": "2", "Vat": "BE0123"},
                {"$type": CUSTOMER, "Code": "3"}
            ])),
            false,
        );

        assert_eq!(codes(&collection), vec!["1", "2", "3"]);
        assert!(collection.fragment().is_none());
        assert_eq!(collection.count(), 3);

        let merged = collection.get(1).and_then(Value::as_model).unwrap();
        assert_eq!(merged.get("Name").and_then(Value::as_str), Some("Arthur"));
        assert_eq!(merged.get("Vat").and_then(Value::as_str), Some("BE0123"));
    }

    #[test]
    fn test_unrelated_page_flushes_fragment() {
        let mut collection = Collection::new();
        collection.fill(
            customers(json!([{"$type": CUSTOMER, "Code": "1"}, {"$type": CUSTOMER, "Code": "2"}])),
            true,
        );
        collection.fill(
            customers(json!([{"$type": CUSTOMER, "Code": "3"}, {"$type": CUSTOMER, "Code": "4"}])),
            true,
        );

        assert_eq!(codes(&collection), vec!["1", "2", "3", "4"]);
        assert_eq!(collection.items.len(), 3);
        assert!(collection.fragment().is_some());

        collection.fill(Value::List(Vec::new()), false);
        assert_eq!(collection.items.len(), 4);
        assert!(collection.fragment().is_none());
    }

    #[test]
    fn test_page_made_of_fragment_continuation_only() {
        let mut collection = Collection::new();
        collection.fill(customers(json!([{"$type": CUSTOMER, "Code": "1", "A": 1}])), true);
        collection.fill(customers(json!([{"$type": CUSTOMER, "Code": "1", "B": 2}])), true);

        // Still pending: nothing else arrived and more is expected
        assert_eq!(collection.count(), 1);
        assert!(collection.fragment().is_some());

        collection.fill(Value::List(Vec::new()), false);
        let model = collection.first().and_then(Value::as_model).unwrap();
        assert!(model.has("A") && model.has("B"));
        assert!(collection.fragment().is_none());
    }

    #[test]
    fn test_raw_records_are_never_merged() {
        let mut collection = Collection::new();
        collection.fill(Value::from(json!([{"Code": "1"}])), true);
        collection.fill(Value::from(json!([{"Code": "1"}])), false);
        assert_eq!(collection.count(), 2);
    }

    #[test]
    fn test_null_page_adds_nothing() {
        let mut collection = Collection::new();
        collection.fill(Value::default(), false);
        assert!(collection.is_empty());

        collection.fill(
            customers(json!([
                {"$type": CUSTOMER, "Code": "1"},
                {"$type": CUSTOMER, "Code": "2"}
            ])),
            true,
        );
        assert!(collection.fragment().is_some());

        collection.fill(Value::default(), false);
        assert!(collection.fragment().is_none());
        assert_eq!(codes(&collection), vec!["1", "2"]);
    }

    #[test]
    fn test_single_value_and_accessors() {
        let mut collection = Collection::new();
        assert!(collection.is_empty());
        assert!(collection.first().is_none());

        collection.fill(Value::from("only"), false);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.first().and_then(Value::as_str), Some("only"));
        assert_eq!(collection.last().and_then(Value::as_str), Some("only"));
        assert_eq!(collection.into_json(), json!(["only"]));
    }

    #[test]
    fn test_all_includes_fragment() {
        let mut collection = Collection::new();
        collection.fill(Value::from(json!(["a", "b"])), true);

        let all: Vec<_> = collection.all().into_iter().filter_map(Value::as_str).collect();
        assert_eq!(all, vec!["a", "b"]);
        assert_eq!(collection.last().and_then(Value::as_str), Some("a"));
        assert_eq!(serde_json::to_value(&collection).unwrap(), json!(["a", "b"]));
    }
}
