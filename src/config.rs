//! Engine configuration
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration. Example:
//!
//! ```toml
//! [enumeration]
//! aggregation_functions = ["sum", "mean"]
//!
//! [render.binning]
//! procedure = "freedman_diaconis"
//! max_bins = 25
//!
//! [render.formats]
//! visualize = true
//! table = false
//! score = true
//! count = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregation::AggFn;
use crate::bind::FormatSet;
use crate::binning::BinningProcedure;
use crate::error::{Error, Result};

/// Top-level configuration of a [`crate::pipeline::Pipeline`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub enumeration: EnumerationConfig,
    /// Render configuration used when a request does not carry its own
    pub render: RenderConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.enumeration.validate()?;
        self.render.validate()
    }
}

/// Options for the case enumerator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Aggregations enumerated for grouped and binned quantitative specs
    pub aggregation_functions: Vec<AggFn>,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        EnumerationConfig {
            aggregation_functions: vec![AggFn::Sum, AggFn::Mean],
        }
    }
}

impl EnumerationConfig {
    fn validate(&self) -> Result<()> {
        if self.aggregation_functions.is_empty() {
            return Err(Error::Config(
                "enumeration.aggregation_functions must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Per-request rendering options consumed by the binder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub binning: BinningConfig,
    pub formats: FormatSet,
    /// Stable-sort scored specs by relevance, highest first
    pub sort_by_relevance: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        self.binning.validate()
    }
}

/// Binning options for continuous fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Procedure used when `num_bins` is not set
    pub procedure: BinningProcedure,
    /// Explicit bin count
    pub num_bins: Option<usize>,
    /// Decimal places for bin labels; inferred from the data when unset
    pub precision: Option<u32>,
    /// Upper bound on the sample used for precision inference
    pub max_sample: usize,
    /// Upper bound on the inferred decimal places
    pub max_precision: u32,
    pub min_bins: usize,
    pub max_bins: usize,
}

impl Default for BinningConfig {
    fn default() -> Self {
        BinningConfig {
            procedure: BinningProcedure::FreedmanDiaconis,
            num_bins: None,
            precision: None,
            max_sample: 100,
            max_precision: 3,
            min_bins: 1,
            max_bins: 25,
        }
    }
}

impl BinningConfig {
    /// Explicit bin count
    pub fn explicit(num_bins: usize) -> Self {
        BinningConfig {
            num_bins: Some(num_bins),
            ..BinningConfig::default()
        }
    }

    pub fn with_procedure(procedure: BinningProcedure) -> Self {
        BinningConfig {
            procedure,
            ..BinningConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_bins == 0 || self.min_bins > self.max_bins {
            return Err(Error::Config(format!(
                "binning bounds must satisfy 1 <= min_bins <= max_bins, got [{}, {}]",
                self.min_bins, self.max_bins
            )));
        }
        if self.num_bins == Some(0) {
            return Err(Error::Config("binning.num_bins must be at least 1".into()));
        }
        if self.max_sample == 0 {
            return Err(Error::Config("binning.max_sample must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.render.binning.max_bins, 25);
        assert_eq!(config.render.binning.procedure, BinningProcedure::FreedmanDiaconis);
        assert_eq!(
            config.enumeration.aggregation_functions,
            vec![AggFn::Sum, AggFn::Mean]
        );
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            [enumeration]
            aggregation_functions = ["median"]

            [render.binning]
            procedure = "sturges"
            num_bins = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.enumeration.aggregation_functions, vec![AggFn::Median]);
        assert_eq!(config.render.binning.procedure, BinningProcedure::Sturges);
        assert_eq!(config.render.binning.num_bins, Some(8));
        assert_eq!(config.render.binning.max_precision, 3);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            EngineConfig::from_toml_str("[enumeration]\naggregation_functions = []"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[render.binning]\nnum_bins = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[render.binning]\nprocedure = \"magic\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut config = EngineConfig::default();
        config.render.sort_by_relevance = true;
        config.render.binning.num_bins = Some(12);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
