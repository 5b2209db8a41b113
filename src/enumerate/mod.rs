//! Case enumeration
//!
//! Turns a schema set and a selection into spec candidates. Four strategies
//! are available, one per [`RecommendationType`]:
//!
//! - `baseline`: single-field cases over the selection, or over every field
//!   when nothing is selected
//! - `subset`: pairs and triples drawn from a selection of three or more
//! - `exact`: the first matching arity pattern of the whole selection
//! - `expanded`: each selected field paired with compatible unselected fields
//!
//! Fields flagged as ids never enter a case function. Candidates are
//! deduplicated on `(procedure, args, field ids)`, keeping the first emission.

mod builders;
mod exact;

use std::collections::HashSet;

use log::debug;

use crate::config::EnumerationConfig;
use crate::error::Result;
use crate::field::{FieldId, FieldSchema, FieldSet, GeneralType};
use crate::spec::{RecommendationType, SpecCandidate};

use self::builders::CaseBuilder;

/// Fields split by general type, in schema order
#[derive(Debug, Clone, Default)]
pub(crate) struct Buckets<'a> {
    pub c: Vec<&'a FieldSchema>,
    pub t: Vec<&'a FieldSchema>,
    pub q: Vec<&'a FieldSchema>,
}

impl<'a> Buckets<'a> {
    /// Bucket fields, leaving out id fields
    pub(crate) fn from_fields(fields: impl IntoIterator<Item = &'a FieldSchema>) -> Self {
        let mut buckets = Buckets::default();
        for field in fields.into_iter().filter(|f| !f.is_id) {
            match field.general_type {
                GeneralType::Categorical => buckets.c.push(field),
                GeneralType::Temporal => buckets.t.push(field),
                GeneralType::Quantitative => buckets.q.push(field),
            }
        }
        buckets
    }

    pub(crate) fn counts(&self) -> (usize, usize, usize) {
        (self.c.len(), self.t.len(), self.q.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.c.len() + self.t.len() + self.q.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &'a FieldSchema> + '_ {
        self.c.iter().chain(&self.t).chain(&self.q).copied()
    }
}

/// Selected and unselected fields of one run
struct Selection<'a> {
    /// Whether the request named any field, id fields included
    requested: bool,
    selected: Vec<&'a FieldSchema>,
    unselected: Vec<&'a FieldSchema>,
}

impl<'a> Selection<'a> {
    fn resolve(fields: &'a FieldSet, selected: &[FieldId]) -> Result<Self> {
        let mut picked: Vec<&'a FieldSchema> = Vec::with_capacity(selected.len());
        for &id in selected {
            let field = fields.get(id)?;
            if !field.is_id && !picked.iter().any(|f| f.id == id) {
                picked.push(field);
            }
        }

        let unselected = fields
            .iter()
            .filter(|f| !f.is_id && !selected.contains(&f.id))
            .collect();

        Ok(Selection {
            requested: !selected.is_empty(),
            selected: picked,
            unselected,
        })
    }
}

fn baseline(builder: &mut CaseBuilder<'_>, fields: &FieldSet, selection: &Selection<'_>) -> Result<()> {
    if !selection.requested {
        fields.iter().try_for_each(|f| builder.single(f))
    } else {
        selection.selected.iter().try_for_each(|f| builder.single(f))
    }
}

fn subset(builder: &mut CaseBuilder<'_>, selection: &Selection<'_>) -> Result<()> {
    let fields = &selection.selected;
    let total = fields.len();
    if total < 3 {
        return Ok(());
    }

    // Combinations as large as the selection belong to `exact`
    for i in 0..total {
        for j in i + 1..total {
            builder.pair(fields[i], fields[j])?;
            if total != 3 {
                for k in j + 1..total {
                    builder.triple(fields[i], fields[j], fields[k])?;
                }
            }
        }
    }
    Ok(())
}

fn compatible(a: &FieldSchema, b: &FieldSchema) -> bool {
    use GeneralType::*;
    matches!(
        (a.general_type, b.general_type),
        (Categorical, Categorical)
            | (Temporal, Temporal)
            | (Quantitative, Quantitative)
            | (Categorical, Quantitative)
            | (Quantitative, Categorical)
            | (Categorical, Temporal)
            | (Temporal, Categorical)
    )
}

fn expanded(builder: &mut CaseBuilder<'_>, selection: &Selection<'_>) -> Result<()> {
    for selected in &selection.selected {
        for other in &selection.unselected {
            if compatible(selected, other) {
                builder.pair(selected, other)?;
            }
        }
    }
    Ok(())
}

/// Enumerate spec candidates for a selection
///
/// `selected` may be empty. Recommendation types are processed in the given
/// order, which is also the order of the returned candidates. Unknown
/// selected ids are rejected with [`crate::Error::InvalidFieldReference`].
pub fn enumerate(
    fields: &FieldSet,
    selected: &[FieldId],
    recommendation_types: &[RecommendationType],
    config: &EnumerationConfig,
) -> Result<Vec<SpecCandidate>> {
    let selection = Selection::resolve(fields, selected)?;
    let mut seen: HashSet<SpecCandidate> = HashSet::new();
    let mut candidates = Vec::new();

    for &recommendation_type in recommendation_types {
        let mut builder = CaseBuilder::new(&config.aggregation_functions, recommendation_type);
        match recommendation_type {
            RecommendationType::Baseline => baseline(&mut builder, fields, &selection)?,
            RecommendationType::Subset => subset(&mut builder, &selection)?,
            RecommendationType::Exact => {
                let buckets = Buckets::from_fields(selection.selected.iter().copied());
                if !buckets.is_empty() {
                    exact::build(&mut builder, &buckets)?;
                }
            }
            RecommendationType::Expanded => expanded(&mut builder, &selection)?,
        }

        let emitted = builder.into_candidates();
        let before = candidates.len();
        let total = emitted.len();
        for candidate in emitted {
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
        }
        debug!(
            "{:?} enumeration kept {} of {} candidates",
            recommendation_type,
            candidates.len() - before,
            total
        );
    }

    Ok(candidates)
}
