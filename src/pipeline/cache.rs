use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;

use crate::error::{Error, Result};
use crate::pipeline::collaborators::DatasetLoader;
use crate::pipeline::DatasetId;
use crate::table::DataTable;

/// In-memory tables keyed by dataset id
///
/// Populated by the ingestion side through [`DatasetCache::insert`]; pipeline
/// runs only read through [`DatasetLoader`]. Readers run concurrently and a
/// single writer per key is assumed. Share it with `Arc` or by reference; it
/// is not a process global.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: RwLock<HashMap<DatasetId, Arc<DataTable>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        DatasetCache::default()
    }

    /// Store a table, returning the one it replaces
    pub fn insert(&self, dataset_id: impl Into<DatasetId>, table: DataTable) -> Result<Option<Arc<DataTable>>> {
        let dataset_id = dataset_id.into();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| Error::upstream(&dataset_id, "Failed to acquire write lock"))?;
        debug!(
            "Caching dataset {} ({} rows, {} columns)",
            dataset_id,
            table.row_count(),
            table.column_count()
        );
        Ok(tables.insert(dataset_id, Arc::new(table)))
    }

    pub fn remove(&self, dataset_id: &DatasetId) -> Result<Option<Arc<DataTable>>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| Error::upstream(dataset_id, "Failed to acquire write lock"))?;
        Ok(tables.remove(dataset_id))
    }

    pub fn contains(&self, dataset_id: &DatasetId) -> bool {
        self.tables
            .read()
            .map(|tables| tables.contains_key(dataset_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.tables.read().map(|tables| tables.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DatasetLoader for DatasetCache {
    fn table(&self, dataset_id: &DatasetId) -> Result<Arc<DataTable>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| Error::upstream(dataset_id, "Failed to acquire read lock"))?;
        tables
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| Error::upstream(dataset_id, "dataset is not cached"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> DataTable {
        DataTable::new(vec![Column::numeric("x", vec![1, 2, 3])]).unwrap()
    }

    #[test]
    fn test_insert_and_load() {
        let cache = DatasetCache::new();
        assert!(cache.insert("sales", table()).unwrap().is_none());
        assert!(cache.contains(&DatasetId::from("sales")));

        let loaded = cache.table(&DatasetId::from("sales")).unwrap();
        assert_eq!(loaded.row_count(), 3);

        // Replacing returns the previous table
        assert!(cache.insert("sales", table()).unwrap().is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_dataset_is_upstream_failure() {
        let cache = DatasetCache::new();
        let err = cache.table(&DatasetId::from("missing")).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::UpstreamDataUnavailable { .. }));
    }

    #[test]
    fn test_remove() {
        let cache = DatasetCache::new();
        cache.insert("a", table()).unwrap();
        assert!(cache.remove(&DatasetId::from("a")).unwrap().is_some());
        assert!(cache.is_empty());
    }
}
