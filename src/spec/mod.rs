//! Visualization spec model
//!
//! A [`SpecCandidate`] names a generating procedure, the fields it reads and
//! the chart kinds it suits. The binder turns it into a [`BoundSpec`] and the
//! scorer into a [`ScoredSpec`].

mod meta;

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::aggregation::AggFn;
use crate::bind::BoundData;
use crate::error::{Error, Result};
use crate::field::FieldId;

pub use self::meta::{AxisLabels, ConstructionToken, SpecMeta, SpecMetaBuilder, TokenKind};

/// Data-shaping algorithm a spec needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeneratingProcedure {
    /// Unique categorical index against raw quantitative values
    #[serde(rename = "ind:val")]
    IndValue,
    #[serde(rename = "val:count")]
    ValueCount,
    #[serde(rename = "bin:agg")]
    BinAggregate,
    #[serde(rename = "val:agg")]
    ValueAggregate,
    #[serde(rename = "val:box")]
    ValueBox,
    #[serde(rename = "val:val")]
    ValueValue,
    #[serde(rename = "multigroup:agg")]
    MultigroupAggregate,
    #[serde(rename = "multigroup:count")]
    MultigroupCount,
    /// One grouping key, several aggregated fields
    #[serde(rename = "val:agg:multi")]
    MultiAggregate,
    /// One grouping key, two aggregated fields plotted against each other
    #[serde(rename = "agg:agg")]
    AggregateAggregate,
}

impl GeneratingProcedure {
    pub fn code(&self) -> &'static str {
        match self {
            GeneratingProcedure::IndValue => "ind:val",
            GeneratingProcedure::ValueCount => "val:count",
            GeneratingProcedure::BinAggregate => "bin:agg",
            GeneratingProcedure::ValueAggregate => "val:agg",
            GeneratingProcedure::ValueBox => "val:box",
            GeneratingProcedure::ValueValue => "val:val",
            GeneratingProcedure::MultigroupAggregate => "multigroup:agg",
            GeneratingProcedure::MultigroupCount => "multigroup:count",
            GeneratingProcedure::MultiAggregate => "val:agg:multi",
            GeneratingProcedure::AggregateAggregate => "agg:agg",
        }
    }
}

impl fmt::Display for GeneratingProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Shape signature of a spec's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeStructure {
    /// Categorical keys against one quantitative series
    #[serde(rename = "c:q")]
    CQ,
    /// Bins against one quantitative series
    #[serde(rename = "b:q")]
    BQ,
    /// Two raw quantitative series
    #[serde(rename = "q:q")]
    QQ,
    /// Categorical keys against value distributions
    #[serde(rename = "c:box")]
    CBox,
    /// Two grouping keys against one quantitative series
    #[serde(rename = "[c,c]:q")]
    CCQ,
    /// One grouping key against several quantitative series
    #[serde(rename = "c:[q]")]
    CMultiQ,
    /// Two aggregated series paired by group
    #[serde(rename = "agg:agg")]
    AggAgg,
}

/// Renderable chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizType {
    Bar,
    Box,
    Grid,
    Hist,
    Line,
    Network,
    Pie,
    Scatter,
    StackedBar,
    Tree,
}

/// Which enumeration strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Baseline,
    Subset,
    Exact,
    Expanded,
}

/// A grouping key, optionally binned before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub field: FieldId,
    #[serde(default)]
    pub binned: bool,
}

impl GroupKey {
    pub fn plain(field: FieldId) -> Self {
        GroupKey { field, binned: false }
    }

    pub fn binned(field: FieldId) -> Self {
        GroupKey { field, binned: true }
    }
}

/// Procedure-specific arguments, one variant per [`GeneratingProcedure`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "procedure", rename_all = "snake_case")]
pub enum SpecArgs {
    IndValue {
        index: FieldId,
        value: FieldId,
    },
    ValueCount {
        field: FieldId,
    },
    BinAggregate {
        bin: FieldId,
        agg: FieldId,
        agg_fn: AggFn,
    },
    ValueAggregate {
        group: FieldId,
        agg: FieldId,
        agg_fn: AggFn,
    },
    ValueBox {
        group: FieldId,
        value: FieldId,
    },
    ValueValue {
        x: FieldId,
        y: FieldId,
    },
    MultigroupAggregate {
        groups: [GroupKey; 2],
        agg: FieldId,
        agg_fn: AggFn,
    },
    MultigroupCount {
        groups: [GroupKey; 2],
    },
    MultiAggregate {
        group: GroupKey,
        aggs: Vec<FieldId>,
        agg_fn: AggFn,
    },
    AggregateAggregate {
        group: FieldId,
        x: FieldId,
        y: FieldId,
        agg_fn: AggFn,
    },
}

impl SpecArgs {
    pub fn procedure(&self) -> GeneratingProcedure {
        match self {
            SpecArgs::IndValue { .. } => GeneratingProcedure::IndValue,
            SpecArgs::ValueCount { .. } => GeneratingProcedure::ValueCount,
            SpecArgs::BinAggregate { .. } => GeneratingProcedure::BinAggregate,
            SpecArgs::ValueAggregate { .. } => GeneratingProcedure::ValueAggregate,
            SpecArgs::ValueBox { .. } => GeneratingProcedure::ValueBox,
            SpecArgs::ValueValue { .. } => GeneratingProcedure::ValueValue,
            SpecArgs::MultigroupAggregate { .. } => GeneratingProcedure::MultigroupAggregate,
            SpecArgs::MultigroupCount { .. } => GeneratingProcedure::MultigroupCount,
            SpecArgs::MultiAggregate { .. } => GeneratingProcedure::MultiAggregate,
            SpecArgs::AggregateAggregate { .. } => GeneratingProcedure::AggregateAggregate,
        }
    }

    /// Fields read by the procedure, in argument order, without repeats
    pub fn referenced_fields(&self) -> Vec<FieldId> {
        let raw: Vec<FieldId> = match self {
            SpecArgs::IndValue { index, value } => vec![*index, *value],
            SpecArgs::ValueCount { field } => vec![*field],
            SpecArgs::BinAggregate { bin, agg, .. } => vec![*bin, *agg],
            SpecArgs::ValueAggregate { group, agg, .. } => vec![*group, *agg],
            SpecArgs::ValueBox { group, value } => vec![*group, *value],
            SpecArgs::ValueValue { x, y } => vec![*x, *y],
            SpecArgs::MultigroupAggregate { groups, agg, .. } => {
                vec![groups[0].field, groups[1].field, *agg]
            }
            SpecArgs::MultigroupCount { groups } => vec![groups[0].field, groups[1].field],
            SpecArgs::MultiAggregate { group, aggs, .. } => {
                std::iter::once(group.field).chain(aggs.iter().copied()).collect()
            }
            SpecArgs::AggregateAggregate { group, x, y, .. } => vec![*group, *x, *y],
        };

        let mut fields = Vec::with_capacity(raw.len());
        for id in raw {
            if !fields.contains(&id) {
                fields.push(id);
            }
        }
        fields
    }

    /// Aggregation function, for procedures that aggregate
    pub fn agg_fn(&self) -> Option<AggFn> {
        match self {
            SpecArgs::BinAggregate { agg_fn, .. }
            | SpecArgs::ValueAggregate { agg_fn, .. }
            | SpecArgs::MultigroupAggregate { agg_fn, .. }
            | SpecArgs::MultiAggregate { agg_fn, .. }
            | SpecArgs::AggregateAggregate { agg_fn, .. } => Some(*agg_fn),
            _ => None,
        }
    }
}

/// A not-yet-bound visualization recommendation
///
/// Equality and hashing consider only `(generating_procedure, args,
/// field_ids)`, which is the deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecCandidate {
    pub generating_procedure: GeneratingProcedure,
    pub type_structure: TypeStructure,
    pub viz_types: BTreeSet<VizType>,
    pub field_ids: Vec<FieldId>,
    pub args: SpecArgs,
    pub meta: SpecMeta,
    pub recommendation_type: RecommendationType,
}

impl SpecCandidate {
    /// Build a candidate; `viz_types` must not be empty
    pub fn new(
        args: SpecArgs,
        type_structure: TypeStructure,
        viz_types: impl IntoIterator<Item = VizType>,
        meta: SpecMeta,
        recommendation_type: RecommendationType,
    ) -> Result<Self> {
        let viz_types: BTreeSet<VizType> = viz_types.into_iter().collect();
        if viz_types.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} spec without visualization types",
                args.procedure()
            )));
        }

        Ok(SpecCandidate {
            generating_procedure: args.procedure(),
            type_structure,
            viz_types,
            field_ids: args.referenced_fields(),
            args,
            meta,
            recommendation_type,
        })
    }

    fn dedup_key(&self) -> (GeneratingProcedure, &SpecArgs, &[FieldId]) {
        (self.generating_procedure, &self.args, &self.field_ids)
    }
}

impl PartialEq for SpecCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}

impl Eq for SpecCandidate {}

impl Hash for SpecCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dedup_key().hash(state);
    }
}

/// A candidate with its bound data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundSpec {
    #[serde(flatten)]
    pub candidate: SpecCandidate,
    pub data: BoundData,
}

/// Kind of score attached to a spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    Relevance,
    Entropy,
    NormalizedEntropy,
    NormalizedVariance,
    Gini,
    Size,
    Correlation,
}

/// One named score; `None` when the metric could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    pub score: Option<f64>,
}

/// Terminal artifact handed to the result sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSpec {
    #[serde(flatten)]
    pub bound: BoundSpec,
    pub scores: Vec<Score>,
}

impl ScoredSpec {
    pub fn candidate(&self) -> &SpecCandidate {
        &self.bound.candidate
    }

    pub fn score(&self, score_type: ScoreType) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.score_type == score_type)
            .and_then(|s| s.score)
    }

    pub fn relevance(&self) -> f64 {
        self.score(ScoreType::Relevance).unwrap_or(0.0)
    }
}
