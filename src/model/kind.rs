//! Entity registry
//!
//! Every entity the client knows about is a `ModelKind` variant with a fixed
//! remote `$type` string. The registry is static: it is built once, on first
//! lookup, and never changes afterwards.

use crate::error::{Error, Result};
use crate::model::ObjectModel;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A relation declared by an entity towards another one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    /// Relation name, as used by `Query::with`
    pub name: &'static str,
    /// Targeted entity
    pub target: ModelKind,
    /// Property on the owning side
    pub left: &'static str,
    /// Property on the targeted side
    pub right: &'static str,
}

/// Known remote entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Address,
    BankAccount,
    BookYear,
    Country,
    Customer,
    DocumentHeader,
    Journal,
    StockTransaction,
    Supplier,
    Third,
    ThirdAddress,
    ThirdCivility,
    Vat,
}

static REGISTRY: LazyLock<HashMap<&'static str, ModelKind>> = LazyLock::new(|| {
    ModelKind::ALL
        .iter()
        .map(|kind| (kind.type_name(), *kind))
        .collect()
});

impl ModelKind {
    /// Every registered entity
    pub const ALL: &'static [ModelKind] = &[
        ModelKind::Address,
        ModelKind::BankAccount,
        ModelKind::BookYear,
        ModelKind::Country,
        ModelKind::Customer,
        ModelKind::DocumentHeader,
        ModelKind::Journal,
        ModelKind::StockTransaction,
        ModelKind::Supplier,
        ModelKind::Third,
        ModelKind::ThirdAddress,
        ModelKind::ThirdCivility,
        ModelKind::Vat,
    ];

    /// The remote `$type` string
    pub fn type_name(self) -> &'static str {
        match self {
            ModelKind::Address => "Winbooks.TORM.OM.Address, Winbooks.TORM.OM",
            ModelKind::BankAccount => "Winbooks.TORM.OM.BankAccount, Winbooks.TORM.OM",
            ModelKind::BookYear => "Winbooks.TORM.OM.Accounting.BookYear, Winbooks.TORM.OM",
            ModelKind::Country => "Winbooks.TORM.OM.Country, Winbooks.TORM.OM",
            ModelKind::Customer => "Winbooks.TORM.OM.Customer, Winbooks.TORM.OM",
            ModelKind::DocumentHeader => {
                "Winbooks.TORM.OM.Logistics.DocumentHeader, Winbooks.TORM.OM"
            }
            ModelKind::Journal => "Winbooks.TORM.OM.Accounting.Journal, Winbooks.TORM.OM",
            ModelKind::StockTransaction => {
                "Winbooks.TORM.OM.Logistics.StockTransaction, Winbooks.TORM.OM"
            }
            ModelKind::Supplier => "Winbooks.TORM.OM.Supplier, Winbooks.TORM.OM",
            ModelKind::Third => "Winbooks.TORM.OM.Third, Winbooks.TORM.OM",
            ModelKind::ThirdAddress => "Winbooks.TORM.OM.Third_Address, Winbooks.TORM.OM",
            ModelKind::ThirdCivility => "Winbooks.TORM.OM.Third_Civility, Winbooks.TORM.OM",
            ModelKind::Vat => "Winbooks.TORM.OM.Vat, Winbooks.TORM.OM",
        }
    }

    /// The Rust-side identifier of this entity
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Address => "Address",
            ModelKind::BankAccount => "BankAccount",
            ModelKind::BookYear => "BookYear",
            ModelKind::Country => "Country",
            ModelKind::Customer => "Customer",
            ModelKind::DocumentHeader => "DocumentHeader",
            ModelKind::Journal => "Journal",
            ModelKind::StockTransaction => "StockTransaction",
            ModelKind::Supplier => "Supplier",
            ModelKind::Third => "Third",
            ModelKind::ThirdAddress => "ThirdAddress",
            ModelKind::ThirdCivility => "ThirdCivility",
            ModelKind::Vat => "Vat",
        }
    }

    /// Singular short name, used in URL paths (`app/{OM}/{code}/...`)
    pub fn om(self) -> &'static str {
        match self {
            ModelKind::ThirdAddress => "Third_Address",
            ModelKind::ThirdCivility => "Third_Civility",
            other => other.name(),
        }
    }

    /// Plural short name, used in URL paths (`app/{OMS}/...`)
    pub fn oms(self) -> String {
        format!("{}s", self.om())
    }

    /// Relations declared by this entity
    pub fn relations(self) -> &'static [RelationDef] {
        match self {
            ModelKind::Customer | ModelKind::Supplier => &[RelationDef {
                name: "third",
                target: ModelKind::Third,
                left: "Third_Id",
                right: "Id",
            }],
            ModelKind::ThirdAddress => &[RelationDef {
                name: "address",
                target: ModelKind::Address,
                left: "Id",
                right: "Address_Id",
            }],
            ModelKind::Journal => &[RelationDef {
                name: "bookYear",
                target: ModelKind::BookYear,
                left: "Id",
                right: "BookYear_Id",
            }],
            _ => &[],
        }
    }

    /// Find a declared relation by name (first letter case-insensitive)
    pub fn relation(self, name: &str) -> Option<&'static RelationDef> {
        self.relations()
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Find the first declared relation targeting the given entity
    pub fn relation_for(self, target: ModelKind) -> Option<&'static RelationDef> {
        self.relations().iter().find(|def| def.target == target)
    }

    /// Look up an entity by its exact `$type` string
    pub fn from_type(type_name: &str) -> Option<Self> {
        REGISTRY.get(type_name).copied()
    }

    /// Look up an entity by `$type` string, OM, OMS or identifier
    pub fn resolve(name: &str) -> Result<Self> {
        let name = name.trim();

        if let Some(kind) = Self::from_type(name) {
            return Ok(kind);
        }

        Self::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(name)
                    || kind.om().eq_ignore_ascii_case(name)
                    || kind.oms().eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| Error::undefined_model(name))
    }

    /// Create an empty model of this entity
    pub fn make(self) -> ObjectModel {
        ObjectModel::new(self)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Whether the value is a string naming a registered `$type`
pub fn is_model_type(value: &JsonValue) -> bool {
    value
        .as_str()
        .is_some_and(|s| ModelKind::from_type(s).is_some())
}

/// Create an empty model for a `$type` string
pub fn make_model_for_type(type_name: &str) -> Result<ObjectModel> {
    ModelKind::from_type(type_name)
        .map(ObjectModel::new)
        .ok_or_else(|| Error::undefined_model(type_name))
}

/// Anything that designates an entity
pub trait IntoModelKind {
    fn into_model_kind(self) -> Result<ModelKind>;
}

impl IntoModelKind for ModelKind {
    fn into_model_kind(self) -> Result<ModelKind> {
        Ok(self)
    }
}

impl IntoModelKind for &ObjectModel {
    fn into_model_kind(self) -> Result<ModelKind> {
        Ok(self.kind())
    }
}

impl IntoModelKind for &str {
    fn into_model_kind(self) -> Result<ModelKind> {
        ModelKind::resolve(self)
    }
}

impl IntoModelKind for String {
    fn into_model_kind(self) -> Result<ModelKind> {
        ModelKind::resolve(&self)
    }
}

impl IntoModelKind for &String {
    fn into_model_kind(self) -> Result<ModelKind> {
        ModelKind::resolve(self)
    }
}
