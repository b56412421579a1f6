//! Enumerated field values accepted by the API

use crate::error::{Error, Result};
use crate::model::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Civility of a third party (`Civility` / `Third_Civility.Code`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CivilityCode {
    #[serde(rename = "ME")]
    Meester,
    #[serde(rename = "VZW")]
    Vzw,
    #[serde(rename = "MEVR")]
    Mevrouw,
    #[serde(rename = "MME")]
    Madame,
    #[serde(rename = "DHR")]
    DeHeer,
    #[serde(rename = "MR")]
    Mijnheer,
    #[serde(rename = "OND")]
    Onderneming,
    #[serde(rename = "NV")]
    Nv,
    #[serde(rename = "AVO")]
    Maitre,
    #[serde(rename = "ETS")]
    Etablissements,
    #[serde(rename = "ASBL")]
    Asbl,
    #[serde(rename = "SPRL")]
    Sprl,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "M")]
    Monsieur,
    #[serde(rename = "BVBA")]
    Bvba,
}

impl CivilityCode {
    pub const ALL: &'static [CivilityCode] = &[
        CivilityCode::Meester,
        CivilityCode::Vzw,
        CivilityCode::Mevrouw,
        CivilityCode::Madame,
        CivilityCode::DeHeer,
        CivilityCode::Mijnheer,
        CivilityCode::Onderneming,
        CivilityCode::Nv,
        CivilityCode::Maitre,
        CivilityCode::Etablissements,
        CivilityCode::Asbl,
        CivilityCode::Sprl,
        CivilityCode::Sa,
        CivilityCode::Monsieur,
        CivilityCode::Bvba,
    ];

    /// The code as sent over the wire
    pub fn as_str(self) -> &'static str {
        match self {
            CivilityCode::Meester => "ME",
            CivilityCode::Vzw => "VZW",
            CivilityCode::Mevrouw => "MEVR",
            CivilityCode::Madame => "MME",
            CivilityCode::DeHeer => "DHR",
            CivilityCode::Mijnheer => "MR",
            CivilityCode::Onderneming => "OND",
            CivilityCode::Nv => "NV",
            CivilityCode::Maitre => "AVO",
            CivilityCode::Etablissements => "ETS",
            CivilityCode::Asbl => "ASBL",
            CivilityCode::Sprl => "SPRL",
            CivilityCode::Sa => "SA",
            CivilityCode::Monsieur => "M",
            CivilityCode::Bvba => "BVBA",
        }
    }
}

impl fmt::Display for CivilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CivilityCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::invalid_argument(format!("Unknown civility code \"{s}\"")))
    }
}

impl From<CivilityCode> for Value {
    fn from(code: CivilityCode) -> Self {
        Value::from(code.as_str())
    }
}

/// VAT regime of a third party (`VatApplicable`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VatApplicable {
    #[default]
    Undefined = 0,
    SubjectTo = 1,
    ExemptFrom = 2,
    NotSubjectTo = 3,
}

impl From<VatApplicable> for u8 {
    fn from(value: VatApplicable) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for VatApplicable {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(VatApplicable::Undefined),
            1 => Ok(VatApplicable::SubjectTo),
            2 => Ok(VatApplicable::ExemptFrom),
            3 => Ok(VatApplicable::NotSubjectTo),
            other => Err(Error::invalid_argument(format!(
                "Unknown VAT applicability {other}"
            ))),
        }
    }
}

impl From<VatApplicable> for Value {
    fn from(value: VatApplicable) -> Self {
        Value::from(i64::from(u8::from(value)))
    }
}
