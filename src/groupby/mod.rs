use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::aggregation::AggFn;
use crate::error::{Error, Result};
use crate::stats;

/// Grouping of row positions by key
///
/// Groups iterate in key order, which keeps every bound output deterministic.
#[derive(Debug, Clone)]
pub struct GroupBy<K>
where
    K: Debug + Ord + Clone,
{
    /// Row positions per key
    groups: BTreeMap<K, Vec<usize>>,

    /// Number of rows the keys were built from
    source_len: usize,
}

/// Aggregated value of one group, with a standard-error interval for means
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate<K> {
    pub key: K,
    pub value: f64,
    /// `(mean - sem, mean + sem)`; `None` when not requested or not computable
    pub interval: Option<(f64, f64)>,
}

impl<K> GroupBy<K>
where
    K: Debug + Ord + Clone,
{
    /// Build groups from per-row keys; rows keyed `None` are left out
    pub fn new(keys: Vec<Option<K>>) -> Self {
        let source_len = keys.len();
        let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
        for (i, key) in keys.into_iter().enumerate() {
            if let Some(key) = key {
                groups.entry(key).or_default().push(i);
            }
        }

        GroupBy { groups, source_len }
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Size of each group, in key order
    pub fn size(&self) -> Vec<(K, usize)> {
        self.groups
            .iter()
            .map(|(k, indices)| (k.clone(), indices.len()))
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&K, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Values of each group gathered from a row-aligned series
    pub fn collect(&self, values: &[f64]) -> Result<Vec<(K, Vec<f64>)>> {
        self.check_len(values)?;
        Ok(self
            .groups
            .iter()
            .map(|(k, indices)| (k.clone(), indices.iter().map(|&i| values[i]).collect()))
            .collect())
    }

    /// Aggregate a row-aligned series per group
    ///
    /// For `mean`, each group also carries `mean ± sem`; groups too small for a
    /// standard error get no interval.
    pub fn aggregate(&self, values: &[f64], agg: AggFn) -> Result<Vec<GroupAggregate<K>>> {
        self.collect(values)?
            .into_iter()
            .map(|(key, group)| {
                let value = agg.apply(&group)?;
                let interval = if agg.has_interval() {
                    stats::sem(&group).ok().map(|sem| (value - sem, value + sem))
                } else {
                    None
                };
                Ok(GroupAggregate {
                    key,
                    value,
                    interval,
                })
            })
            .collect()
    }

    fn check_len(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.source_len {
            return Err(Error::LengthMismatch {
                expected: self.source_len,
                actual: values.len(),
            });
        }
        Ok(())
    }
}
