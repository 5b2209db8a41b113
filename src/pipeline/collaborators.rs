//! Interfaces to the systems around the recommendation core
//!
//! Schemas, tables and result persistence belong to other services; the
//! pipeline only sees them through these traits. In-process implementations
//! are provided for embedding and tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use log::info;

use crate::error::{Error, Result};
use crate::field::FieldSchema;
use crate::pipeline::{DatasetId, RecommendationRequest};
use crate::spec::ScoredSpec;
use crate::table::DataTable;

/// Source of the field schemas of a dataset
pub trait FieldSchemaProvider: Send + Sync {
    fn field_schemas(&self, dataset_id: &DatasetId) -> Result<Vec<FieldSchema>>;
}

/// Source of the in-memory table of a dataset
pub trait DatasetLoader: Send + Sync {
    fn table(&self, dataset_id: &DatasetId) -> Result<Arc<DataTable>>;
}

/// Destination of scored specs
///
/// Persisting the same request twice must leave one result set.
pub trait ResultSink: Send + Sync {
    fn persist(&self, request: &RecommendationRequest, specs: &[ScoredSpec]) -> Result<()>;
}

/// Receiver of coarse pipeline progress
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Enumerating,
    Binding,
    Scoring,
    Saving,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Enumerating => "enumerating",
            Stage::Binding => "binding",
            Stage::Scoring => "scoring",
            Stage::Saving => "saving",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub item_count: usize,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Enumerating => write!(f, "enumerating specs"),
            stage => write!(f, "{} {} specs", stage, self.item_count),
        }
    }
}

/// Reports progress through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        info!("{}", event);
    }
}

/// Discards progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Field schemas registered per dataset
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<DatasetId, Vec<FieldSchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    pub fn register(&self, dataset_id: impl Into<DatasetId>, schemas: Vec<FieldSchema>) -> Result<()> {
        let dataset_id = dataset_id.into();
        let mut registry = self
            .schemas
            .write()
            .map_err(|_| Error::upstream(&dataset_id, "Failed to acquire write lock"))?;
        registry.insert(dataset_id, schemas);
        Ok(())
    }
}

impl FieldSchemaProvider for SchemaRegistry {
    fn field_schemas(&self, dataset_id: &DatasetId) -> Result<Vec<FieldSchema>> {
        let registry = self
            .schemas
            .read()
            .map_err(|_| Error::upstream(dataset_id, "Failed to acquire read lock"))?;
        registry
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| Error::upstream(dataset_id, "no field schemas registered"))
    }
}

/// Keeps the latest result set per request key
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<HashMap<String, Vec<ScoredSpec>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn get(&self, request: &RecommendationRequest) -> Option<Vec<ScoredSpec>> {
        let key = request.key().ok()?;
        self.results.lock().ok()?.get(&key).cloned()
    }

    /// Number of distinct requests persisted
    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for MemorySink {
    fn persist(&self, request: &RecommendationRequest, specs: &[ScoredSpec]) -> Result<()> {
        let key = request.key()?;
        let mut results = self
            .results
            .lock()
            .map_err(|_| Error::upstream(&request.dataset_id, "Failed to acquire sink lock"))?;
        results.insert(key, specs.to_vec());
        Ok(())
    }
}
