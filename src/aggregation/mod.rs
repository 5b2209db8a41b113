//! Aggregation registry
//!
//! The closed set of aggregation functions the binder may apply to a group of
//! values, plus a static name lookup for configuration and request parsing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats;

/// Named aggregation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
    Std,
    Sem,
}

lazy_static::lazy_static! {
    /// Name to function lookup, including common aliases
    static ref AGGREGATIONS: HashMap<&'static str, AggFn> = {
        let mut m = HashMap::new();
        for agg in AggFn::ALL {
            m.insert(agg.name(), agg);
        }
        m.insert("avg", AggFn::Mean);
        m.insert("average", AggFn::Mean);
        m.insert("size", AggFn::Count);
        m.insert("stddev", AggFn::Std);
        m
    };
}

impl AggFn {
    pub const ALL: [AggFn; 8] = [
        AggFn::Sum,
        AggFn::Mean,
        AggFn::Median,
        AggFn::Min,
        AggFn::Max,
        AggFn::Count,
        AggFn::Std,
        AggFn::Sem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Mean => "mean",
            AggFn::Median => "median",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Count => "count",
            AggFn::Std => "std",
            AggFn::Sem => "sem",
        }
    }

    /// Look up a function by name or alias (case-insensitive)
    pub fn lookup(name: &str) -> Option<AggFn> {
        AGGREGATIONS.get(name.trim().to_lowercase().as_str()).copied()
    }

    /// Whether the binder should attach a confidence interval
    pub fn has_interval(&self) -> bool {
        matches!(self, AggFn::Mean)
    }

    /// Apply the function to one group of values
    pub fn apply(&self, values: &[f64]) -> Result<f64> {
        if values.is_empty() && !matches!(self, AggFn::Count | AggFn::Sum) {
            return Err(Error::EmptyData(format!("{} of an empty group", self.name())));
        }

        match self {
            AggFn::Sum => Ok(values.iter().sum()),
            AggFn::Mean => stats::mean(values),
            AggFn::Median => Ok(stats::percentile(values, 0.5)),
            AggFn::Min => Ok(values.iter().copied().fold(f64::INFINITY, f64::min)),
            AggFn::Max => Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            AggFn::Count => Ok(values.len() as f64),
            AggFn::Std => Ok(stats::variance(values, 1)?.sqrt()),
            AggFn::Sem => stats::sem(values),
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggFn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AggFn::lookup(s).ok_or_else(|| Error::InvalidInput(format!("Unknown aggregation function '{}'", s)))
    }
}
