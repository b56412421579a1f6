//! Criteria query builder
//!
//! A `Query` serializes into the document expected by the `ExecuteCriteria`
//! endpoint:
//!
//! ```text
//! { "EntityType", "Alias", "Association"?, "ProjectionsList"?,
//!   "Conditions"?, "Orders"?, "FirstResult"?, "MaxResult"? }
//! ```
//!
//! Only non-empty sections are emitted.

use super::join::{Join, Relation};
use super::operator::{IntoOperator, Operator};
use super::property::{IntoProperty, Property};
use crate::error::{Error, Result};
use crate::model::{IntoModelKind, ModelKind};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Default alias of the queried entity
pub const DEFAULT_ALIAS: &str = "this";

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Compare against another property
    Property(Property),
    /// Compare against literal values
    Values(Vec<JsonValue>),
}

impl Operand {
    /// Parse a property operand
    pub fn property(raw: impl IntoProperty) -> Result<Self> {
        Ok(Self::Property(raw.into_property()?))
    }
}

impl From<Property> for Operand {
    fn from(property: Property) -> Self {
        Self::Property(property)
    }
}

impl From<JsonValue> for Operand {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(values) => Self::Values(values),
            other => Self::Values(vec![other]),
        }
    }
}

impl From<Vec<JsonValue>> for Operand {
    fn from(values: Vec<JsonValue>) -> Self {
        Self::Values(values)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Values(vec![JsonValue::from(value)])
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::Values(vec![JsonValue::from(value)])
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Values(vec![JsonValue::from(value)])
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Values(vec![JsonValue::from(value)])
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Self::Values(vec![JsonValue::from(value)])
    }
}

/// A projection (`ProjectionsList` entry)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Projection {
    pub property_name: Property,
    pub operator: Operator,
}

/// A filter (`Conditions` entry)
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: Operator,
    pub property: Property,
    pub other_property: Option<Property>,
    pub values: Vec<JsonValue>,
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let other = self
            .other_property
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("Operator", &self.operator)?;
        map.serialize_entry("PropertyName", &self.property)?;
        map.serialize_entry("OtherPropertyName", &other)?;
        map.serialize_entry("Values", &self.values)?;
        map.end()
    }
}

/// An ordering clause
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub property: Property,
    pub ascending: bool,
}

/// Sort direction, as accepted by `Query::order_by_direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(Error::invalid_argument(format!(
                "Unknown order direction \"{other}\""
            ))),
        }
    }
}

/// Criteria query against one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    kind: ModelKind,
    alias: String,
    projections: Vec<Projection>,
    associations: Vec<Join>,
    conditions: Vec<Condition>,
    orders: Vec<Order>,
    cursor: Option<u64>,
    amount: Option<u64>,
    /// Cursor was filled in by `take`, not requested through `skip`
    auto_cursor: bool,
}

impl Query {
    /// Create a query on the given entity, aliased `this`
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            alias: DEFAULT_ALIAS.to_string(),
            projections: Vec::new(),
            associations: Vec::new(),
            conditions: Vec::new(),
            orders: Vec::new(),
            cursor: None,
            amount: None,
            auto_cursor: false,
        }
    }

    /// Create a query on an entity designated by name, type string or model
    pub fn of(target: impl IntoModelKind) -> Result<Self> {
        Ok(Self::new(target.into_model_kind()?))
    }

    /// Override the queried entity's alias
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Add projections with the `SELECT` operator
    pub fn select<I, P>(self, properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: IntoProperty,
    {
        self.select_operator(Operator::select(), properties)
    }

    /// Add projections with a custom operator (`COUNT`, `MAX`, ...)
    pub fn select_operator<I, P>(mut self, operator: impl IntoOperator, properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: IntoProperty,
    {
        let operator = operator.into_operator()?;

        for property in properties {
            self.projections.push(Projection {
                property_name: property.into_property()?,
                operator,
            });
        }

        Ok(self)
    }

    /// Remove every projection
    #[must_use]
    pub fn clear_projections(mut self) -> Self {
        self.projections.clear();
        self
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    /// Add an equality condition
    pub fn filter(self, property: impl IntoProperty, value: impl Into<Operand>) -> Result<Self> {
        self.filter_operator(property, Operator::equal(), value)
    }

    /// Add a condition with an explicit operator. When the value is a
    /// `Property`, the condition compares two properties.
    pub fn filter_operator(
        mut self,
        property: impl IntoProperty,
        operator: impl IntoOperator,
        value: impl Into<Operand>,
    ) -> Result<Self> {
        let property = property.into_property()?;
        let operator = operator.into_operator()?;

        let condition = match value.into() {
            Operand::Property(other) => Condition {
                operator: operator.for_property(),
                property,
                other_property: Some(other),
                values: Vec::new(),
            },
            Operand::Values(values) => Condition {
                operator,
                property,
                other_property: None,
                values,
            },
        };

        self.conditions.push(condition);
        Ok(self)
    }

    /// Add a condition from a loose definition, `[property, value]` or
    /// `[property, operator, value]`, as read from JSON or the command line
    pub fn filter_definition(self, definition: &[JsonValue]) -> Result<Self> {
        if definition.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "Too few arguments provided to \"where\" condition. At least 2 expected, {} given.",
                definition.len()
            )));
        }

        let property = definition[0].as_str().ok_or_else(|| {
            Error::invalid_argument(format!(
                "Condition property must be a string, got {}",
                definition[0]
            ))
        })?;

        if definition.len() == 2 {
            return self.filter(property, definition[1].clone());
        }

        self.filter_operator(property, &definition[1], definition[2].clone())
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Order by a property, ascending
    pub fn order_by(self, property: impl IntoProperty) -> Result<Self> {
        self.order_by_direction(property, Direction::Asc)
    }

    /// Order by a property, descending
    pub fn order_by_desc(self, property: impl IntoProperty) -> Result<Self> {
        self.order_by_direction(property, Direction::Desc)
    }

    pub fn order_by_direction(mut self, property: impl IntoProperty, direction: Direction) -> Result<Self> {
        self.orders.push(Order {
            property: property.into_property()?,
            ascending: direction == Direction::Asc,
        });
        Ok(self)
    }

    /// Remove every ordering clause
    #[must_use]
    pub fn clear_orders(mut self) -> Self {
        self.orders.clear();
        self
    }

    // ========================================================================
    // Associations
    // ========================================================================

    /// Join another entity. A relation declared by the queried entity
    /// towards that target is used when there is one.
    pub fn join(self, target: impl IntoModelKind) -> Result<Self> {
        self.join_with(target, Ok)
    }

    /// Join another entity and configure the join before it is added
    pub fn join_with<F>(self, target: impl IntoModelKind, configure: F) -> Result<Self>
    where
        F: FnOnce(Join) -> Result<Join>,
    {
        let target = target.into_model_kind()?;

        let join = match self.kind.relation_for(target) {
            Some(def) => Relation::declared(self.kind, def)?.into_join(),
            None => Join::new(self.kind, target),
        };

        self.associate_with(join, configure)
    }

    /// Join through a relation declared by the queried entity
    pub fn with(self, relation: &str) -> Result<Self> {
        self.with_configured(relation, Ok)
    }

    /// Join through a declared relation and configure it before it is added
    pub fn with_configured<F>(self, relation: &str, configure: F) -> Result<Self>
    where
        F: FnOnce(Join) -> Result<Join>,
    {
        let name = Relation::extract_relation_name(Some(relation))
            .unwrap_or_else(|| relation.to_string());
        let relation = Relation::named(self.kind, &name)?;

        self.associate_with(relation, configure)
    }

    /// Add a configured join. Joins are keyed by alias; a later join with
    /// the same alias replaces the earlier one.
    pub fn associate(self, join: impl Into<Join>) -> Result<Self> {
        self.associate_with(join, Ok)
    }

    pub fn associate_with<F>(mut self, join: impl Into<Join>, configure: F) -> Result<Self>
    where
        F: FnOnce(Join) -> Result<Join>,
    {
        let join = configure(join.into())?;
        join.fail_if_not_usable()?;

        match self
            .associations
            .iter_mut()
            .find(|existing| existing.get_alias() == join.get_alias())
        {
            Some(existing) => *existing = join,
            None => self.associations.push(join),
        }

        Ok(self)
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Limit the number of results (`MaxResult`). The API ignores
    /// `MaxResult` without `FirstResult`, so the cursor is set to 0 when
    /// missing. Removing the limit removes that implicit cursor again.
    #[must_use]
    pub fn take(mut self, amount: Option<u64>) -> Self {
        match amount {
            Some(amount) => {
                self.amount = Some(amount);
                if self.cursor.is_none() {
                    self.cursor = Some(0);
                    self.auto_cursor = true;
                }
            }
            None => {
                self.amount = None;
                if self.auto_cursor {
                    self.cursor = None;
                    self.auto_cursor = false;
                }
            }
        }
        self
    }

    /// Skip the first results (`FirstResult`)
    #[must_use]
    pub fn skip(mut self, amount: Option<u64>) -> Self {
        self.cursor = amount;
        self.auto_cursor = false;
        self
    }

    /// Fetch page `page` (1-based, default 1) of `per_page` results.
    /// `None` removes pagination altogether. Offsets past `u64::MAX`
    /// saturate.
    #[must_use]
    pub fn paginate(self, per_page: Option<u64>, page: Option<u64>) -> Self {
        match per_page {
            Some(per_page) => {
                let page = page.unwrap_or(1).max(1);
                self.take(Some(per_page))
                    .skip(Some((page - 1).saturating_mul(per_page)))
            }
            None => self.take(None).skip(None),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn get_alias(&self) -> &str {
        &self.alias
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn associations(&self) -> &[Join] {
        &self.associations
    }

    pub fn association(&self, alias: &str) -> Option<&Join> {
        self.associations.iter().find(|j| j.get_alias() == alias)
    }

    /// `FirstResult`
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// `MaxResult`
    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    /// The criteria document as JSON
    pub fn to_document(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

struct Associations<'a>(&'a [Join]);

impl Serialize for Associations<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for join in self.0 {
            map.serialize_entry(join.get_alias(), join)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OrderDocument<'a> {
    property_name: &'a str,
    alias: &'a str,
    projections: &'static [JsonValue],
    ascending: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CriteriaDocument<'a> {
    entity_type: &'static str,
    alias: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    association: Option<Associations<'a>>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    projections_list: &'a [Projection],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    conditions: &'a [Condition],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    orders: Vec<OrderDocument<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_result: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_result: Option<u64>,
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let orders = self
            .orders
            .iter()
            .map(|order| OrderDocument {
                property_name: order.property.name(),
                alias: order.property.origin().unwrap_or(&self.alias),
                projections: &[],
                ascending: order.ascending,
            })
            .collect();

        CriteriaDocument {
            entity_type: self.kind.type_name(),
            alias: &self.alias,
            association: (!self.associations.is_empty()).then(|| Associations(&self.associations)),
            projections_list: &self.projections,
            conditions: &self.conditions,
            orders,
            first_result: self.cursor,
            max_result: self.amount,
        }
        .serialize(serializer)
    }
}
