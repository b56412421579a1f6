//! Criteria operators
//!
//! The remote criteria engine encodes every comparison, projection and
//! aggregation as an integer code. Operators can be given as codes,
//! symbols (`=`, `>=`, ...) or names (`"is not null"`, `"LIKE"`).

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;

macro_rules! operator_codes {
    ($($name:ident = $code:literal),* $(,)?) => {
        /// Operator codes understood by `ExecuteCriteria`
        pub mod code {
            $(pub const $name: i64 = $code;)*
        }

        /// Named operators, as looked up by `Operator::resolve`
        const NAMED_CODES: &[(&str, i64)] = &[$((stringify!($name), $code)),*];
    };
}

operator_codes! {
    EQ = 0,
    EQPROPERTY = 1,
    BETWEEN = 2,
    GE = 3,
    GEPROPERTY = 4,
    GT = 5,
    GTPROPERTY = 6,
    IN = 7,
    ISNOTNULL = 8,
    ISNOTEMPTY = 9,
    ISNULL = 10,
    ISEMPTY = 11,
    ISNOTNUMERIC = 12,
    ISNUMERIC = 13,
    LE = 14,
    LEPROPERTY = 15,
    LIKE = 16,
    LT = 17,
    LTPROPERTY = 18,
    OR = 19,
    AND = 20,
    NOT = 21,
    SELECT = 22,
    DISTINCT = 23,
    SELECTTOP = 24,
    AVG = 25,
    COUNT = 26,
    FIRST = 27,
    LAST = 28,
    MAX = 29,
    MIN = 30,
    SUM = 31,
    GROUPBY = 32,
    HAVING = 33,
    UCASE = 34,
    LCASE = 35,
    MID = 36,
    LEN = 37,
    ROUND = 38,
    NOW = 39,
    FORMAT = 40,
    CASEWHEN = 41,
    CAST = 42,
    CONSTANT = 43,
    FROMALIAS = 44,
    ROWNUMBER = 45,
    DATEADD = 46,
    DATEDIFF = 47,
    ALL = 48,
    ROWCOUNT = 49,
    EXISTS = 50,
    CONCAT = 51,
    LEFT = 52,
    RIGHT = 53,
    FUNCTION = 54,
    ABS = 55,
    SUBQUERY = 56,
    LTRIM = 57,
    RTRIM = 58,
    DATEPART = 59,
    UNION = 60,
    UNIONALL = 61,
    GROUPING = 62,
    RANK = 63,
    DENSERANK = 64,
}

/// Symbolic aliases
const SYMBOLS: &[(&str, i64)] = &[
    ("=", code::EQ),
    ("==", code::EQ),
    (">=", code::GE),
    (">", code::GT),
    ("<=", code::LE),
    ("<", code::LT),
];

/// Comparison codes and their property-to-property counterparts
const PROPERTY_VARIANTS: &[(i64, i64)] = &[
    (code::EQ, code::EQPROPERTY),
    (code::GE, code::GEPROPERTY),
    (code::GT, code::GTPROPERTY),
    (code::LE, code::LEPROPERTY),
    (code::LT, code::LTPROPERTY),
];

/// What the right-hand side of an operator is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorMode {
    /// Compared against a set of literal values
    #[default]
    Value,
    /// Compared against another property
    Property,
}

/// A resolved criteria operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    code: i64,
    mode: OperatorMode,
}

impl Operator {
    /// Wrap a raw code. Any integer is accepted.
    pub fn from_code(code: i64) -> Self {
        Self {
            code,
            mode: OperatorMode::Value,
        }
    }

    /// Resolve a symbol or a name (case and whitespace insensitive).
    /// Numeric strings are taken as raw codes.
    pub fn resolve(value: &str) -> Result<Self> {
        let symbol = value.trim().to_uppercase();

        if let Some(code) = parse_numeric(&symbol) {
            return Ok(Self::from_code(code));
        }

        if let Some((_, code)) = SYMBOLS.iter().find(|(s, _)| *s == symbol) {
            return Ok(Self::from_code(*code));
        }

        let name: String = symbol.chars().filter(|c| *c != ' ').collect();

        NAMED_CODES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| Self::from_code(*code))
            .ok_or_else(|| Error::undefined_operator(format!("\"{value}\"")))
    }

    /// Resolve an operator from a loose JSON value (number or string)
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .map(Self::from_code)
                .ok_or_else(|| Error::undefined_operator(format!("\"{n}\""))),
            Value::String(s) => Self::resolve(s),
            other => Err(Error::undefined_operator(format!(
                "operator cannot be of type \"{}\"",
                json_type_name(other)
            ))),
        }
    }

    /// The code sent over the wire
    pub fn code(&self) -> i64 {
        self.code
    }

    /// The current comparison mode
    pub fn mode(&self) -> OperatorMode {
        self.mode
    }

    /// Whether this operator compares against another property
    pub fn is_for_property(&self) -> bool {
        self.mode == OperatorMode::Property
    }

    /// Switch to property mode. Plain comparisons (`EQ`, `GE`, `GT`, `LE`,
    /// `LT`) become their `…PROPERTY` variant; other codes are kept.
    #[must_use]
    pub fn for_property(self) -> Self {
        let code = PROPERTY_VARIANTS
            .iter()
            .find(|(plain, _)| *plain == self.code)
            .map_or(self.code, |(_, property)| *property);

        Self {
            code,
            mode: OperatorMode::Property,
        }
    }

    /// Switch back to value mode, undoing the `…PROPERTY` remapping
    #[must_use]
    pub fn for_value(self) -> Self {
        let code = PROPERTY_VARIANTS
            .iter()
            .find(|(_, property)| *property == self.code)
            .map_or(self.code, |(plain, _)| *plain);

        Self {
            code,
            mode: OperatorMode::Value,
        }
    }

    pub fn equal() -> Self {
        Self::from_code(code::EQ)
    }

    pub fn eq_property() -> Self {
        Self {
            code: code::EQPROPERTY,
            mode: OperatorMode::Property,
        }
    }

    pub fn select() -> Self {
        Self::from_code(code::SELECT)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code)
    }
}

impl From<i64> for Operator {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

impl TryFrom<&str> for Operator {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::resolve(value)
    }
}

impl TryFrom<String> for Operator {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::resolve(&value)
    }
}

impl TryFrom<&Value> for Operator {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_json(value)
    }
}

fn parse_numeric(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Anything that can be resolved into an `Operator`
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

impl IntoOperator for i64 {
    fn into_operator(self) -> Result<Operator> {
        Ok(Operator::from_code(self))
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        Operator::resolve(self)
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Result<Operator> {
        Operator::resolve(&self)
    }
}

impl IntoOperator for &Value {
    fn into_operator(self) -> Result<Operator> {
        Operator::from_json(self)
    }
}
