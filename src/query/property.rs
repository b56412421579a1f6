//! Property references (`[alias.]FieldName`)

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A field reference, optionally prefixed by the alias of its origin entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    origin: Option<String>,
    name: String,
}

impl Property {
    /// Parse a dotted reference. Blank segments are dropped and the field
    /// name gets its first letter capitalized.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw
            .split('.')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        match parts.as_slice() {
            [] => Err(Error::invalid_argument("Property cannot be empty")),
            [name] => Ok(Self {
                origin: None,
                name: capitalize(name),
            }),
            [origin, name, ..] => Ok(Self {
                origin: Some((*origin).to_string()),
                name: capitalize(name),
            }),
        }
    }

    /// The origin alias, if any
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// The capitalized field name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Property {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Property {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&String> for Property {
    type Error = Error;

    fn try_from(value: &String) -> Result<Self> {
        Self::parse(value)
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Uppercase the first character, leaving the rest untouched
pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, leaving the rest untouched
pub(crate) fn decapitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Anything that can be parsed into a `Property`
pub trait IntoProperty {
    fn into_property(self) -> Result<Property>;
}

impl IntoProperty for Property {
    fn into_property(self) -> Result<Property> {
        Ok(self)
    }
}

impl IntoProperty for &Property {
    fn into_property(self) -> Result<Property> {
        Ok(self.clone())
    }
}

impl IntoProperty for &str {
    fn into_property(self) -> Result<Property> {
        Property::parse(self)
    }
}

impl IntoProperty for String {
    fn into_property(self) -> Result<Property> {
        Property::parse(&self)
    }
}

impl IntoProperty for &String {
    fn into_property(self) -> Result<Property> {
        Property::parse(self)
    }
}
