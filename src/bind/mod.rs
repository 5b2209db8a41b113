//! Data binding of spec candidates
//!
//! The binder resolves a candidate's fields against a table, filters rows,
//! runs the candidate's generating procedure and keeps only the output formats
//! the caller asked for. A candidate that cannot be bound is dropped, never
//! failing the batch it belongs to.

pub mod conditionals;
mod frame;
pub mod output;
mod procedures;

use std::fmt;

use log::{debug, warn};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::field::FieldSet;
use crate::spec::{BoundSpec, SpecCandidate};
use crate::table::DataTable;

pub use self::conditionals::{Condition, Conditionals, Operation};
pub use self::output::{BoundData, FormatSet, OutputFormat, ScoreSeries, TableData};

use self::frame::Frame;

/// Why a candidate produced no bound spec
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// No rows survived conditionals and missing-value filtering
    EmptyResultAfterFiltering,
    /// The generating procedure failed on this data
    BinderFailure(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::EmptyResultAfterFiltering => f.write_str("no rows after filtering"),
            DropReason::BinderFailure(reason) => write!(f, "binder failure: {}", reason),
        }
    }
}

/// Result of binding one candidate
#[derive(Debug, Clone)]
pub enum BindOutcome {
    Bound(BoundSpec),
    Dropped(DropReason),
}

impl BindOutcome {
    pub fn bound(self) -> Option<BoundSpec> {
        match self {
            BindOutcome::Bound(spec) => Some(spec),
            BindOutcome::Dropped(_) => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, BindOutcome::Dropped(_))
    }
}

/// Binds candidates of one run against one table
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    table: &'a DataTable,
    fields: &'a FieldSet,
    conditionals: &'a Conditionals,
    render: &'a RenderConfig,
}

impl<'a> Binder<'a> {
    pub fn new(
        table: &'a DataTable,
        fields: &'a FieldSet,
        conditionals: &'a Conditionals,
        render: &'a RenderConfig,
    ) -> Self {
        Binder {
            table,
            fields,
            conditionals,
            render,
        }
    }

    /// Bind one candidate
    ///
    /// Returns `Err` only for candidates that reference fields outside the
    /// schema set or the table; every data-dependent failure is a
    /// [`BindOutcome::Dropped`].
    pub fn bind(&self, candidate: &SpecCandidate) -> Result<BindOutcome> {
        let frame = Frame::new(self.table, self.fields, &candidate.field_ids, self.conditionals)?;
        if frame.is_empty() {
            debug!(
                "Dropping {} spec over {:?}: no rows after filtering",
                candidate.generating_procedure, candidate.field_ids
            );
            return Ok(BindOutcome::Dropped(DropReason::EmptyResultAfterFiltering));
        }

        let shaped = match procedures::shape(&candidate.args, &frame, &self.render.binning) {
            Ok(shaped) => shaped,
            Err(e) => {
                warn!(
                    "Dropping {} spec over {:?}: {}",
                    candidate.generating_procedure, candidate.field_ids, e
                );
                return Ok(BindOutcome::Dropped(DropReason::BinderFailure(e.to_string())));
            }
        };

        let formats = self.render.formats;
        let data = BoundData {
            visualize: formats.visualize.then(|| shaped.visualize()),
            table: formats.table.then(|| TableData {
                columns: shaped.columns.clone(),
                rows: shaped.rows.clone(),
            }),
            count: formats.count.then(|| frame.len()),
            score: formats.score.then_some(shaped.score),
        };

        Ok(BindOutcome::Bound(BoundSpec {
            candidate: candidate.clone(),
            data,
        }))
    }
}

/// Bind one candidate against a table
///
/// Convenience wrapper over [`Binder`]. Unresolvable field references are
/// reported as [`Error::InvalidFieldReference`] or [`Error::ColumnNotFound`].
pub fn bind(
    candidate: &SpecCandidate,
    table: &DataTable,
    fields: &FieldSet,
    conditionals: &Conditionals,
    render: &RenderConfig,
) -> Result<BindOutcome> {
    Binder::new(table, fields, conditionals, render).bind(candidate)
}

/// Whether a bind error means the candidate itself is malformed
pub(crate) fn is_reference_error(err: &Error) -> bool {
    matches!(err, Error::InvalidFieldReference(_) | Error::ColumnNotFound(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggFn;
    use crate::field::{FieldId, FieldSchema};
    use crate::spec::{RecommendationType, SpecArgs, SpecMeta, TypeStructure, VizType};
    use crate::table::Column;

    fn fixture() -> (DataTable, FieldSet) {
        let table = DataTable::new(vec![
            Column::text("dept", vec!["eng", "ops", "eng"]),
            Column::numeric_opt("salary", vec![Some(10.0), Some(20.0), None]),
            Column::numeric_opt("empty", vec![None::<f64>, None, None]),
        ])
        .unwrap();
        let fields = FieldSet::new(vec![
            FieldSchema::categorical(1, "dept"),
            FieldSchema::quantitative(2, "salary"),
            FieldSchema::quantitative(3, "empty"),
        ])
        .unwrap();
        (table, fields)
    }

    fn candidate(args: SpecArgs, structure: TypeStructure) -> SpecCandidate {
        SpecCandidate::new(
            args,
            structure,
            [VizType::Bar],
            SpecMeta::default(),
            RecommendationType::Baseline,
        )
        .unwrap()
    }

    #[test]
    fn test_bind_value_count() {
        let (table, fields) = fixture();
        let spec = candidate(SpecArgs::ValueCount { field: FieldId(1) }, TypeStructure::CQ);
        let outcome = bind(&spec, &table, &fields, &Conditionals::none(), &RenderConfig::default()).unwrap();
        let bound = outcome.bound().unwrap();

        assert_eq!(bound.data.count, Some(3));
        let table_data = bound.data.table.unwrap();
        assert_eq!(table_data.columns, vec!["dept", "count"]);
        let visualize = bound.data.visualize.unwrap();
        assert_eq!(visualize.len(), 3);
    }

    #[test]
    fn test_only_requested_formats() {
        let (table, fields) = fixture();
        let spec = candidate(SpecArgs::ValueCount { field: FieldId(1) }, TypeStructure::CQ);
        let render = RenderConfig {
            formats: FormatSet::only(&[OutputFormat::Score]),
            ..RenderConfig::default()
        };
        let bound = bind(&spec, &table, &fields, &Conditionals::none(), &render)
            .unwrap()
            .bound()
            .unwrap();
        assert!(bound.data.score.is_some());
        assert!(bound.data.table.is_none());
        assert!(bound.data.visualize.is_none());
        assert!(bound.data.count.is_none());
    }

    #[test]
    fn test_empty_frame_dropped() {
        let (table, fields) = fixture();
        let spec = candidate(SpecArgs::ValueCount { field: FieldId(3) }, TypeStructure::CQ);
        let outcome = bind(&spec, &table, &fields, &Conditionals::none(), &RenderConfig::default()).unwrap();
        assert!(matches!(
            outcome,
            BindOutcome::Dropped(DropReason::EmptyResultAfterFiltering)
        ));
    }

    #[test]
    fn test_handler_failure_dropped() {
        let (table, fields) = fixture();
        // Each dept group holds a single salary after filtering
        let spec = candidate(
            SpecArgs::ValueAggregate {
                group: FieldId(1),
                agg: FieldId(2),
                agg_fn: AggFn::Std,
            },
            TypeStructure::CQ,
        );
        let outcome = bind(&spec, &table, &fields, &Conditionals::none(), &RenderConfig::default()).unwrap();
        assert!(matches!(outcome, BindOutcome::Dropped(DropReason::BinderFailure(_))));
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let (table, fields) = fixture();
        let spec = candidate(SpecArgs::ValueCount { field: FieldId(42) }, TypeStructure::CQ);
        let err = bind(&spec, &table, &fields, &Conditionals::none(), &RenderConfig::default()).unwrap_err();
        assert!(is_reference_error(&err));
    }

    #[test]
    fn test_conditionals_limit_rows() {
        let (table, fields) = fixture();
        let spec = candidate(SpecArgs::ValueCount { field: FieldId(1) }, TypeStructure::CQ);
        let conditionals = Conditionals::none().and(Condition::new(1, Operation::Eq, "ops"));
        let bound = bind(&spec, &table, &fields, &conditionals, &RenderConfig::default())
            .unwrap()
            .bound()
            .unwrap();
        assert_eq!(bound.data.count, Some(1));
    }
}
