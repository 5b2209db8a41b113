//! Static type and scale tables
//!
//! Maps every concrete data type reported by type detection to its general
//! type and its scale. Lookups are total and stateless.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Coarse statistical kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneralType {
    Categorical,
    Quantitative,
    Temporal,
}

impl GeneralType {
    /// Single-letter code used in descriptions (`c`, `q`, `t`)
    pub fn code(&self) -> &'static str {
        match self {
            GeneralType::Categorical => "c",
            GeneralType::Quantitative => "q",
            GeneralType::Temporal => "t",
        }
    }
}

/// Statistical scale of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Nominal,
    Ordinal,
    Continuous,
}

/// Concrete data type reported by type detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Decimal,
    String,
    Boolean,
    Text,
    Url,
    City,
    CountryCode2,
    CountryCode3,
    CountryName,
    Continent,
    Datetime,
    Date,
    Time,
    Year,
    Month,
    Day,
}

/// Every concrete type, in table order
pub const ALL_DATA_TYPES: [DataType; 17] = [
    DataType::Integer,
    DataType::Decimal,
    DataType::String,
    DataType::Boolean,
    DataType::Text,
    DataType::Url,
    DataType::City,
    DataType::CountryCode2,
    DataType::CountryCode3,
    DataType::CountryName,
    DataType::Continent,
    DataType::Datetime,
    DataType::Date,
    DataType::Time,
    DataType::Year,
    DataType::Month,
    DataType::Day,
];

impl DataType {
    pub fn general_type(&self) -> GeneralType {
        match self {
            DataType::Integer | DataType::Decimal => GeneralType::Quantitative,
            DataType::Datetime
            | DataType::Date
            | DataType::Time
            | DataType::Year
            | DataType::Month
            | DataType::Day => GeneralType::Temporal,
            DataType::String
            | DataType::Boolean
            | DataType::Text
            | DataType::Url
            | DataType::City
            | DataType::CountryCode2
            | DataType::CountryCode3
            | DataType::CountryName
            | DataType::Continent => GeneralType::Categorical,
        }
    }

    pub fn scale(&self) -> Scale {
        match self {
            DataType::Decimal
            | DataType::Integer
            | DataType::Datetime
            | DataType::Date
            | DataType::Time => Scale::Continuous,
            DataType::Year | DataType::Month | DataType::Day => Scale::Ordinal,
            _ => Scale::Nominal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Text => "text",
            DataType::Url => "url",
            DataType::City => "city",
            DataType::CountryCode2 => "country_code_2",
            DataType::CountryCode3 => "country_code_3",
            DataType::CountryName => "country_name",
            DataType::Continent => "continent",
            DataType::Datetime => "datetime",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Year => "year",
            DataType::Month => "month",
            DataType::Day => "day",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Accepts snake_case names as well as the camelCase spellings
    /// (`countryCode2`) some detectors emit.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        ALL_DATA_TYPES
            .iter()
            .find(|t| t.name().replace('_', "") == normalized)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("Unknown data type '{}'", s)))
    }
}
