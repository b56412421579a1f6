//! Criteria queries
//!
//! Builds the JSON documents sent to the `ExecuteCriteria` endpoint.
//!
//! # Overview
//!
//! - `Operator` resolves symbols, names and raw codes to operator codes
//! - `Property` parses `[alias.]Field` references
//! - `Join` / `Relation` describe associations with other entities
//! - `Query` assembles projections, conditions, joins, ordering and pagination
//!
//! ```rust,ignore
//! use winbooks::model::ModelKind;
//! use winbooks::query::Query;
//!
//! let query = Query::new(ModelKind::Customer)
//!     .select(["Id", "Code"])?
//!     .filter("Code", "ARTHUR")?
//!     .with("third")?
//!     .take(Some(10));
//! ```

mod criteria;
mod join;
mod operator;
pub(crate) mod property;

pub use criteria::{Condition, Direction, Operand, Order, Projection, Query, DEFAULT_ALIAS};
pub use join::{Join, Relation};
pub use operator::{code, IntoOperator, Operator, OperatorMode};
pub use property::{IntoProperty, Property};
