//! Associations between the queried entity and other entities
//!
//! A `Join` is built ad hoc by the caller; a `Relation` is a join declared
//! up front by an entity (see `ModelKind::relations`).

use super::operator::{IntoOperator, Operator};
use super::property::{decapitalize, IntoProperty, Property};
use crate::error::{Error, Result};
use crate::model::{ModelKind, RelationDef};
use serde::Serialize;
use std::ops::Deref;

/// A join condition between an owning entity and a targeted entity
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    from: ModelKind,
    to: ModelKind,
    owner: Option<String>,
    alias: String,
    left: Option<Property>,
    operator: Option<Operator>,
    right: Option<Property>,
}

impl Join {
    /// Create an unconfigured join. The alias defaults to the lowercased
    /// short name of the target.
    pub fn new(from: ModelKind, to: ModelKind) -> Self {
        Self {
            from,
            to,
            owner: None,
            alias: to.om().to_lowercase(),
            left: None,
            operator: None,
            right: None,
        }
    }

    /// Owning entity
    pub fn from_kind(&self) -> ModelKind {
        self.from
    }

    /// Targeted entity
    pub fn target(&self) -> ModelKind {
        self.to
    }

    pub fn is_targeting(&self, kind: ModelKind) -> bool {
        self.to == kind
    }

    /// Set (or clear) the owner-side alias
    #[must_use]
    pub fn owner(mut self, alias: Option<&str>) -> Self {
        self.owner = alias.map(str::to_string);
        self
    }

    /// Override the association alias
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn get_alias(&self) -> &str {
        &self.alias
    }

    pub fn get_owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Join on `left = right`, comparing two properties
    pub fn on(mut self, left: impl IntoProperty, right: impl IntoProperty) -> Result<Self> {
        self.left = Some(left.into_property()?);
        self.right = Some(right.into_property()?);
        self.operator = Some(Operator::eq_property());
        Ok(self)
    }

    /// Join on `left <operator> right`. The operator is switched to
    /// property mode.
    pub fn on_operator(
        mut self,
        left: impl IntoProperty,
        operator: impl IntoOperator,
        right: impl IntoProperty,
    ) -> Result<Self> {
        self.left = Some(left.into_property()?);
        self.operator = Some(operator.into_operator()?.for_property());
        self.right = Some(right.into_property()?);
        Ok(self)
    }

    /// Alias of `on`
    pub fn using(self, left: impl IntoProperty, right: impl IntoProperty) -> Result<Self> {
        self.on(left, right)
    }

    /// Alias of `on_operator`
    pub fn using_operator(
        self,
        left: impl IntoProperty,
        operator: impl IntoOperator,
        right: impl IntoProperty,
    ) -> Result<Self> {
        self.on_operator(left, operator, right)
    }

    /// Check that the join has an alias and a complete condition
    pub fn fail_if_not_usable(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(Error::invalid_join("Missing alias for association"));
        }

        if self.left.is_none() || self.operator.is_none() || self.right.is_none() {
            return Err(Error::invalid_join("Missing condition for association"));
        }

        Ok(())
    }
}

/// Wire shape of an association entry
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssociationDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_alias: Option<&'a str>,
    alias_name: &'a str,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    join_type: Option<&'a Operator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left_property: Option<&'a Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right_property: Option<&'a Property>,
}

impl Serialize for Join {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        AssociationDocument {
            owner_alias: self.owner.as_deref(),
            alias_name: &self.alias,
            kind: self.to.type_name(),
            join_type: self.operator.as_ref(),
            left_property: self.left.as_ref(),
            right_property: self.right.as_ref(),
        }
        .serialize(serializer)
    }
}

/// A join declared by the owning entity itself
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: Option<String>,
    join: Join,
}

impl Relation {
    /// Create an unconfigured relation, optionally overriding its alias
    pub fn new(from: ModelKind, to: ModelKind, alias: Option<&str>) -> Self {
        let join = match alias {
            Some(alias) if !alias.is_empty() => Join::new(from, to).alias(alias),
            _ => Join::new(from, to),
        };
        Self { name: None, join }
    }

    /// Look up a relation declared by `from` under the given name
    pub fn named(from: ModelKind, name: &str) -> Result<Self> {
        let def = from.relation(name).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Undefined relation \"{name}\" on {}",
                from.name()
            ))
        })?;
        Self::declared(from, def)
    }

    /// Build a declared relation with its condition in place
    pub fn declared(from: ModelKind, def: &RelationDef) -> Result<Self> {
        let join = Join::new(from, def.target).using(def.left, def.right)?;
        Ok(Self {
            name: Some(def.name.to_string()),
            join,
        })
    }

    /// The declared relation name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Configure the relation condition (see `Join::on`)
    pub fn using(self, left: impl IntoProperty, right: impl IntoProperty) -> Result<Self> {
        let Self { name, join } = self;
        Ok(Self {
            name,
            join: join.using(left, right)?,
        })
    }

    pub fn into_join(self) -> Join {
        self.join
    }

    /// Whether a method-style accessor name follows `get<Name>Relation`
    pub fn is_relation_method(method: Option<&str>) -> bool {
        let Some(method) = method else {
            return false;
        };

        method != "getRelation"
            && method.len() > "getRelation".len()
            && method.starts_with("get")
            && method.ends_with("Relation")
    }

    /// Extract the relation name from a `get<Name>Relation` accessor name
    pub fn extract_relation_name(method: Option<&str>) -> Option<String> {
        if !Self::is_relation_method(method) {
            return None;
        }

        method
            .and_then(|m| m.strip_prefix("get"))
            .and_then(|m| m.strip_suffix("Relation"))
            .map(decapitalize)
    }
}

impl Deref for Relation {
    type Target = Join;

    fn deref(&self) -> &Join {
        &self.join
    }
}

impl From<Relation> for Join {
    fn from(relation: Relation) -> Self {
        relation.join
    }
}
