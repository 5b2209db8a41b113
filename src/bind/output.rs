use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Output formats a caller may request from the binder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Visualize,
    Table,
    Score,
    Count,
}

/// Requested formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSet {
    pub visualize: bool,
    pub table: bool,
    pub score: bool,
    pub count: bool,
}

impl Default for FormatSet {
    fn default() -> Self {
        FormatSet::all()
    }
}

impl FormatSet {
    pub fn all() -> Self {
        FormatSet {
            visualize: true,
            table: true,
            score: true,
            count: true,
        }
    }

    pub fn none() -> Self {
        FormatSet {
            visualize: false,
            table: false,
            score: false,
            count: false,
        }
    }

    pub fn only(formats: &[OutputFormat]) -> Self {
        formats.iter().fold(FormatSet::none(), |set, f| set.with(*f))
    }

    pub fn with(mut self, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Visualize => self.visualize = true,
            OutputFormat::Table => self.table = true,
            OutputFormat::Score => self.score = true,
            OutputFormat::Count => self.count = true,
        }
        self
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Visualize => self.visualize,
            OutputFormat::Table => self.table,
            OutputFormat::Score => self.score,
            OutputFormat::Count => self.count,
        }
    }
}

/// `{columns, rows}` table format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Json>>,
}

/// Named numeric series consumed by the scorer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSeries(BTreeMap<String, Vec<f64>>);

impl ScoreSeries {
    pub const AGG: &'static str = "agg";
    pub const COUNT: &'static str = "count";
    pub const VAL: &'static str = "val";
    pub const X: &'static str = "x";
    pub const Y: &'static str = "y";
    pub const LOWER: &'static str = "lower";
    pub const UPPER: &'static str = "upper";

    pub fn new() -> Self {
        ScoreSeries::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.0.insert(name.into(), values);
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// First present series among `agg`, `count`, `val`
    pub fn univariate(&self) -> Option<&[f64]> {
        [Self::AGG, Self::COUNT, Self::VAL]
            .iter()
            .find_map(|name| self.get(name))
    }

    /// The `x` and `y` series, when both are present
    pub fn bivariate(&self) -> Option<(&[f64], &[f64])> {
        Some((self.get(Self::X)?, self.get(Self::Y)?))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Data attached to a bound spec; only requested formats are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualize: Option<Vec<Vec<Json>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}
