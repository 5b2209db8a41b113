//! Recommendation pipeline
//!
//! One run moves forward through enumeration, binding, scoring and output.
//! Candidates that fail to bind are dropped before scoring; scoring never
//! drops a spec. A run aborts on collaborator failures and on requests that
//! reference fields outside the schema set.
//!
//! # Example
//!
//! ```rust
//! use vizspec::pipeline::{
//!     DatasetCache, MemorySink, Pipeline, RecommendationRequest, SchemaRegistry,
//! };
//! use vizspec::{Column, DataTable, FieldSchema, RecommendationType};
//!
//! let cache = DatasetCache::new();
//! cache
//!     .insert(
//!         "hr",
//!         DataTable::new(vec![Column::text("dept", vec!["eng", "ops", "eng"])]).unwrap(),
//!     )
//!     .unwrap();
//! let schemas = SchemaRegistry::new();
//! schemas.register("hr", vec![FieldSchema::categorical(1, "dept")]).unwrap();
//! let sink = MemorySink::new();
//!
//! let pipeline = Pipeline::new(&schemas, &cache, &sink);
//! let request = RecommendationRequest::new("hr", vec![RecommendationType::Baseline]);
//! let specs = pipeline.run(&request).unwrap();
//! assert_eq!(specs.len(), 1);
//! ```

mod cache;
mod collaborators;

use std::fmt;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bind::{is_reference_error, BindOutcome, Binder, Conditionals, OutputFormat};
use crate::config::{EngineConfig, RenderConfig};
use crate::enumerate::enumerate;
use crate::error::{Error, Result};
use crate::field::{FieldId, FieldSet};
use crate::score::score;
use crate::spec::{RecommendationType, ScoredSpec};

pub use self::cache::DatasetCache;
pub use self::collaborators::{
    DatasetLoader, FieldSchemaProvider, LogProgress, MemorySink, NoProgress, ProgressEvent,
    ProgressReporter, ResultSink, SchemaRegistry, Stage,
};

/// Identifier of a dataset in the schema provider, loader and cache
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(id: &str) -> Self {
        DatasetId(id.to_string())
    }
}

impl From<String> for DatasetId {
    fn from(id: String) -> Self {
        DatasetId(id)
    }
}

/// Input of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub dataset_id: DatasetId,
    #[serde(default)]
    pub selected_fields: Vec<FieldId>,
    pub recommendation_types: Vec<RecommendationType>,
    #[serde(default)]
    pub conditionals: Conditionals,
    /// Overrides the engine's render configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_config: Option<RenderConfig>,
}

impl RecommendationRequest {
    pub fn new(
        dataset_id: impl Into<DatasetId>,
        recommendation_types: Vec<RecommendationType>,
    ) -> Self {
        RecommendationRequest {
            dataset_id: dataset_id.into(),
            selected_fields: Vec::new(),
            recommendation_types,
            conditionals: Conditionals::none(),
            render_config: None,
        }
    }

    pub fn select(mut self, fields: impl IntoIterator<Item = u64>) -> Self {
        self.selected_fields = fields.into_iter().map(FieldId).collect();
        self
    }

    pub fn with_conditionals(mut self, conditionals: Conditionals) -> Self {
        self.conditionals = conditionals;
        self
    }

    pub fn with_render_config(mut self, render_config: RenderConfig) -> Self {
        self.render_config = Some(render_config);
        self
    }

    /// Stable key of the request, used by sinks to stay idempotent
    pub fn key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

static NO_PROGRESS: NoProgress = NoProgress;

/// Orchestrates enumeration, binding, scoring and persistence
pub struct Pipeline<'a> {
    schemas: &'a dyn FieldSchemaProvider,
    loader: &'a dyn DatasetLoader,
    sink: &'a dyn ResultSink,
    progress: &'a dyn ProgressReporter,
    config: EngineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        schemas: &'a dyn FieldSchemaProvider,
        loader: &'a dyn DatasetLoader,
        sink: &'a dyn ResultSink,
    ) -> Self {
        Pipeline {
            schemas,
            loader,
            sink,
            progress: &NO_PROGRESS,
            config: EngineConfig::default(),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn report(&self, stage: Stage, item_count: usize) {
        self.progress.report(ProgressEvent { stage, item_count });
    }

    /// Run one request and hand its scored specs to the sink
    pub fn run(&self, request: &RecommendationRequest) -> Result<Vec<ScoredSpec>> {
        let dataset_id = &request.dataset_id;
        let upstream = |e: Error| {
            if e.is_fatal() {
                e
            } else {
                Error::upstream(dataset_id, e.to_string())
            }
        };

        let render = request
            .render_config
            .clone()
            .unwrap_or_else(|| self.config.render.clone());
        render.validate()?;

        let fields = FieldSet::new(self.schemas.field_schemas(dataset_id).map_err(upstream)?)?;
        for id in request.conditionals.field_ids() {
            fields.get(id)?;
        }

        self.report(Stage::Enumerating, 0);
        let candidates = enumerate(
            &fields,
            &request.selected_fields,
            &request.recommendation_types,
            &self.config.enumeration,
        )?;

        let table = self.loader.table(dataset_id).map_err(upstream)?;

        self.report(Stage::Binding, candidates.len());
        // Scoring reads the score series whether or not the caller asked for it
        let bind_render = RenderConfig {
            formats: render.formats.with(OutputFormat::Score),
            ..render.clone()
        };
        let binder = Binder::new(&table, &fields, &request.conditionals, &bind_render);
        let mut bound = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match binder.bind(candidate) {
                Ok(BindOutcome::Bound(spec)) => bound.push(spec),
                Ok(BindOutcome::Dropped(reason)) => {
                    debug!("{} spec dropped: {}", candidate.generating_procedure, reason)
                }
                Err(e) if is_reference_error(&e) => {
                    warn!("Rejecting {} spec: {}", candidate.generating_procedure, e)
                }
                Err(e) => return Err(e),
            }
        }

        self.report(Stage::Scoring, bound.len());
        let mut scored: Vec<ScoredSpec> = bound
            .into_iter()
            .map(|spec| {
                let mut scored = score(spec, &request.selected_fields);
                if !render.formats.score {
                    scored.bound.data.score = None;
                }
                scored
            })
            .collect();
        if render.sort_by_relevance {
            scored.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));
        }

        self.report(Stage::Saving, scored.len());
        self.sink.persist(request, &scored)?;

        debug!(
            "Dataset {}: {} candidates, {} scored specs",
            dataset_id,
            candidates.len(),
            scored.len()
        );
        Ok(scored)
    }

    /// Run independent requests in parallel
    ///
    /// Results are in request order; one failing request does not affect the
    /// others.
    pub fn run_batch(&self, requests: &[RecommendationRequest]) -> Vec<Result<Vec<ScoredSpec>>> {
        requests.par_iter().map(|request| self.run(request)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_is_stable() {
        let a = RecommendationRequest::new("hr", vec![RecommendationType::Exact]).select([1, 2]);
        let b = RecommendationRequest::new("hr", vec![RecommendationType::Exact]).select([1, 2]);
        assert_eq!(a.key().unwrap(), b.key().unwrap());

        let c = b.clone().select([2]);
        assert_ne!(a.key().unwrap(), c.key().unwrap());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{"dataset_id": "hr", "recommendation_types": ["baseline", "exact"]}"#;
        let request: RecommendationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.dataset_id, DatasetId::from("hr"));
        assert!(request.selected_fields.is_empty());
        assert!(request.conditionals.is_empty());
        assert!(request.render_config.is_none());
    }
}
