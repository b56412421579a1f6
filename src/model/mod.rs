//! Remote entities
//!
//! - `ModelKind`: static registry of known entities and their declared relations
//! - `ObjectModel`: attribute bag for one entity instance
//! - `Value`: raw JSON, typed model or list, as found in responses

mod kind;
mod object;
mod value;

pub use kind::{is_model_type, make_model_for_type, IntoModelKind, ModelKind, RelationDef};
pub use object::ObjectModel;
pub use value::{Value, TYPE_KEY};

use serde_json::Value as JsonValue;

/// Promote raw data into a typed model when it carries a registered `$type`.
/// Arrays are promoted element by element; other data passes through.
pub fn to_model(raw: JsonValue) -> Value {
    match raw {
        JsonValue::Array(items) => Value::List(items.into_iter().map(Value::promote).collect()),
        other => Value::promote(other),
    }
}

#[cfg(test)]
mod tests;
