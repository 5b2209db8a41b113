//! Visualization recommendation core
//!
//! Given typed field schemas and an optional selection of fields, `vizspec`
//! enumerates candidate visualization specs, binds each candidate to the data
//! it needs, and scores the survivors for relevance and statistical interest.
//!
//! The main entry points are [`enumerate()`], [`bind::bind`], [`score::score`]
//! and the [`Pipeline`] orchestrator that sequences them.

#![allow(clippy::too_many_arguments)]

pub mod aggregation;
pub mod bind;
pub mod binning;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod field;
pub mod groupby;
pub mod pipeline;
pub mod score;
pub mod spec;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use aggregation::AggFn;
pub use bind::{BindOutcome, Binder, Condition, Conditionals, DropReason, FormatSet, Operation, OutputFormat};
pub use config::{BinningConfig, EngineConfig, EnumerationConfig, RenderConfig};
pub use enumerate::enumerate;
pub use error::{Error, Result};
pub use field::{DataType, FieldId, FieldSchema, FieldSet, GeneralType, Scale};
pub use pipeline::{DatasetId, Pipeline, RecommendationRequest};
pub use spec::{
    BoundSpec, GeneratingProcedure, RecommendationType, ScoreType, ScoredSpec, SpecArgs,
    SpecCandidate, TypeStructure, VizType,
};
pub use table::{Column, DataTable, Value};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
