use crate::aggregation::AggFn;
use crate::error::Result;
use crate::field::{FieldSchema, GeneralType, Scale};
use crate::spec::{
    GroupKey, RecommendationType, SpecArgs, SpecCandidate, SpecMeta, SpecMetaBuilder,
    TypeStructure, VizType,
};

/// Case functions for one, two and three fields
///
/// Every builder appends zero or more candidates tagged with the builder's
/// recommendation type. Builders take fields in canonical type order
/// (categorical, temporal, quantitative); [`CaseBuilder::pair`] and
/// [`CaseBuilder::triple`] reorder arbitrary combinations.
pub(crate) struct CaseBuilder<'a> {
    agg_fns: &'a [AggFn],
    recommendation_type: RecommendationType,
    candidates: Vec<SpecCandidate>,
}

const CATEGORY_VIZ: &[VizType] = &[VizType::Bar, VizType::Tree, VizType::Pie];
const TREND_VIZ: &[VizType] = &[VizType::Bar, VizType::Line];
const BAR_VIZ: &[VizType] = &[VizType::Bar];

fn title(agg_fn: AggFn) -> String {
    let name = agg_fn.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn aggregate_label(agg_fn: AggFn, field: &FieldSchema) -> String {
    format!("{}({})", agg_fn, field.name)
}

/// Grouping key for a field, binned when the field is continuous
fn group_key(field: &FieldSchema) -> GroupKey {
    if field.is_continuous() {
        GroupKey::binned(field.id)
    } else {
        GroupKey::plain(field.id)
    }
}

fn type_rank(field: &FieldSchema) -> u8 {
    match field.general_type {
        GeneralType::Categorical => 0,
        GeneralType::Temporal => 1,
        GeneralType::Quantitative => 2,
    }
}

impl<'a> CaseBuilder<'a> {
    pub(crate) fn new(agg_fns: &'a [AggFn], recommendation_type: RecommendationType) -> Self {
        CaseBuilder {
            agg_fns,
            recommendation_type,
            candidates: Vec::new(),
        }
    }

    pub(crate) fn into_candidates(self) -> Vec<SpecCandidate> {
        self.candidates
    }

    fn emit(
        &mut self,
        args: SpecArgs,
        type_structure: TypeStructure,
        viz_types: &[VizType],
        meta: SpecMeta,
    ) -> Result<()> {
        let candidate = SpecCandidate::new(
            args,
            type_structure,
            viz_types.iter().copied(),
            meta,
            self.recommendation_type,
        )?;
        self.candidates.push(candidate);
        Ok(())
    }

    /// Single-field cases
    pub(crate) fn single(&mut self, field: &FieldSchema) -> Result<()> {
        if field.is_id {
            return Ok(());
        }
        match field.general_type {
            GeneralType::Categorical => {
                if field.is_unique {
                    return Ok(());
                }
                self.value_count(field, CATEGORY_VIZ)
            }
            GeneralType::Quantitative => {
                if field.scale == Scale::Ordinal {
                    self.value_count(field, BAR_VIZ)
                } else {
                    self.histogram(field)
                }
            }
            GeneralType::Temporal => {
                if field.is_continuous() {
                    self.value_count(field, &[VizType::Line, VizType::Scatter])?;
                    self.histogram(field)
                } else {
                    self.value_count(field, CATEGORY_VIZ)
                }
            }
        }
    }

    fn value_count(&mut self, field: &FieldSchema, viz_types: &[VizType]) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .text("Count of")
            .field(field)
            .labels(field.name.as_str(), "count")
            .build();
        self.emit(
            SpecArgs::ValueCount { field: field.id },
            TypeStructure::CQ,
            viz_types,
            meta,
        )
    }

    fn histogram(&mut self, field: &FieldSchema) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .text("Distribution of")
            .field(field)
            .labels(field.name.as_str(), "count")
            .build();
        self.emit(
            SpecArgs::BinAggregate {
                bin: field.id,
                agg: field.id,
                agg_fn: AggFn::Count,
            },
            TypeStructure::BQ,
            &[VizType::Hist],
            meta,
        )
    }

    fn bin_aggregate(
        &mut self,
        bin: &FieldSchema,
        agg: &FieldSchema,
        agg_fn: AggFn,
        viz_types: &[VizType],
    ) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .text(format!("{} of", title(agg_fn)))
            .field(agg)
            .text("by binned")
            .field(bin)
            .labels(bin.name.as_str(), aggregate_label(agg_fn, agg))
            .build();
        self.emit(
            SpecArgs::BinAggregate {
                bin: bin.id,
                agg: agg.id,
                agg_fn,
            },
            TypeStructure::BQ,
            viz_types,
            meta,
        )
    }

    fn value_value(&mut self, x: &FieldSchema, y: &FieldSchema, viz_types: &[VizType]) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .field(x)
            .text("vs.")
            .field(y)
            .labels(x.name.as_str(), y.name.as_str())
            .build();
        self.emit(
            SpecArgs::ValueValue { x: x.id, y: y.id },
            TypeStructure::QQ,
            viz_types,
            meta,
        )
    }

    fn value_aggregates(
        &mut self,
        group: &FieldSchema,
        q: &FieldSchema,
        viz_types: impl Fn(AggFn) -> &'static [VizType],
    ) -> Result<()> {
        for &agg_fn in self.agg_fns {
            let meta = SpecMetaBuilder::new()
                .text(format!("{} of", title(agg_fn)))
                .field(q)
                .text("by")
                .field(group)
                .labels(group.name.as_str(), aggregate_label(agg_fn, q))
                .build();
            self.emit(
                SpecArgs::ValueAggregate {
                    group: group.id,
                    agg: q.id,
                    agg_fn,
                },
                TypeStructure::CQ,
                viz_types(agg_fn),
                meta,
            )?;
        }
        Ok(())
    }

    fn value_box(&mut self, group: &FieldSchema, q: &FieldSchema) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .text("Distribution of")
            .field(q)
            .text("by")
            .field(group)
            .labels(group.name.as_str(), q.name.as_str())
            .build();
        self.emit(
            SpecArgs::ValueBox {
                group: group.id,
                value: q.id,
            },
            TypeStructure::CBox,
            &[VizType::Box],
            meta,
        )
    }

    fn multigroup_count(
        &mut self,
        first: &FieldSchema,
        second: &FieldSchema,
        groups: [GroupKey; 2],
        viz_types: &[VizType],
    ) -> Result<()> {
        let meta = SpecMetaBuilder::new()
            .text("Count by")
            .fields(&[first, second])
            .labels(first.name.as_str(), "count")
            .build();
        self.emit(
            SpecArgs::MultigroupCount { groups },
            TypeStructure::CCQ,
            viz_types,
            meta,
        )
    }

    fn multigroup_aggregates(
        &mut self,
        first: &FieldSchema,
        second: &FieldSchema,
        groups: [GroupKey; 2],
        q: &FieldSchema,
        viz_types: &[VizType],
    ) -> Result<()> {
        for &agg_fn in self.agg_fns {
            let meta = SpecMetaBuilder::new()
                .text(format!("{} of", title(agg_fn)))
                .field(q)
                .text("by")
                .fields(&[first, second])
                .labels(first.name.as_str(), aggregate_label(agg_fn, q))
                .build();
            self.emit(
                SpecArgs::MultigroupAggregate {
                    groups,
                    agg: q.id,
                    agg_fn,
                },
                TypeStructure::CCQ,
                viz_types,
                meta,
            )?;
        }
        Ok(())
    }

    fn multi_aggregates(
        &mut self,
        group: &FieldSchema,
        key: GroupKey,
        qs: &[&FieldSchema],
        viz_types: &[VizType],
    ) -> Result<()> {
        for &agg_fn in self.agg_fns {
            let meta = SpecMetaBuilder::new()
                .text(format!("{} of", title(agg_fn)))
                .fields(qs)
                .text("by")
                .field(group)
                .labels(group.name.as_str(), agg_fn.name())
                .build();
            self.emit(
                SpecArgs::MultiAggregate {
                    group: key,
                    aggs: qs.iter().map(|q| q.id).collect(),
                    agg_fn,
                },
                TypeStructure::CMultiQ,
                viz_types,
                meta,
            )?;
        }
        Ok(())
    }

    /// Two fields in any order
    pub(crate) fn pair(&mut self, a: &FieldSchema, b: &FieldSchema) -> Result<()> {
        let (a, b) = if type_rank(a) <= type_rank(b) { (a, b) } else { (b, a) };
        match (a.general_type, b.general_type) {
            (GeneralType::Categorical, GeneralType::Categorical) => self.c_c(a, b),
            (GeneralType::Categorical, GeneralType::Temporal) => self.c_t(a, b),
            (GeneralType::Categorical, GeneralType::Quantitative) => self.c_q(a, b),
            (GeneralType::Temporal, GeneralType::Temporal) => self.t_t(a, b),
            (GeneralType::Temporal, GeneralType::Quantitative) => self.t_q(a, b),
            (GeneralType::Quantitative, GeneralType::Quantitative) => self.q_q(a, b),
            _ => Ok(()),
        }
    }

    /// Three fields in any order; only `C×C×Q`, `C×T×Q` and `C×Q×Q` shapes emit
    pub(crate) fn triple(&mut self, a: &FieldSchema, b: &FieldSchema, c: &FieldSchema) -> Result<()> {
        let mut fields = [a, b, c];
        fields.sort_by_key(|f| type_rank(f));
        let [x, y, z] = fields;
        match (x.general_type, y.general_type, z.general_type) {
            (GeneralType::Categorical, GeneralType::Categorical, GeneralType::Quantitative) => {
                self.c_c_q(x, y, z)
            }
            (GeneralType::Categorical, GeneralType::Temporal, GeneralType::Quantitative) => {
                self.c_t_q(x, y, z)
            }
            (GeneralType::Categorical, GeneralType::Quantitative, GeneralType::Quantitative) => {
                self.c_multi_q(x, &[y, z])
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn c_c(&mut self, a: &FieldSchema, b: &FieldSchema) -> Result<()> {
        if a.is_unique || b.is_unique {
            return Ok(());
        }
        let groups = [GroupKey::plain(a.id), GroupKey::plain(b.id)];
        self.multigroup_count(a, b, groups, &[VizType::StackedBar, VizType::Network])
    }

    pub(crate) fn q_q(&mut self, a: &FieldSchema, b: &FieldSchema) -> Result<()> {
        self.value_value(a, b, &[VizType::Scatter])?;
        self.bin_aggregate(a, b, AggFn::Mean, &[VizType::Bar, VizType::Line])?;
        self.bin_aggregate(b, a, AggFn::Mean, &[VizType::Bar, VizType::Line])
    }

    pub(crate) fn t_t(&mut self, a: &FieldSchema, b: &FieldSchema) -> Result<()> {
        self.value_value(a, b, &[VizType::Scatter])
    }

    pub(crate) fn c_q(&mut self, c: &FieldSchema, q: &FieldSchema) -> Result<()> {
        if c.is_unique {
            let meta = SpecMetaBuilder::new()
                .field(q)
                .text("by")
                .field(c)
                .labels(c.name.as_str(), q.name.as_str())
                .build();
            return self.emit(
                SpecArgs::IndValue {
                    index: c.id,
                    value: q.id,
                },
                TypeStructure::CQ,
                &[VizType::Bar],
                meta,
            );
        }

        self.value_aggregates(c, q, |agg_fn| match agg_fn {
            AggFn::Sum => CATEGORY_VIZ,
            _ => BAR_VIZ,
        })?;
        self.value_box(c, q)
    }

    pub(crate) fn c_t(&mut self, c: &FieldSchema, t: &FieldSchema) -> Result<()> {
        if c.is_unique {
            return Ok(());
        }
        let groups = [GroupKey::plain(c.id), group_key(t)];
        self.multigroup_count(c, t, groups, &[VizType::Line, VizType::StackedBar])
    }

    pub(crate) fn t_q(&mut self, t: &FieldSchema, q: &FieldSchema) -> Result<()> {
        if t.is_continuous() {
            self.value_value(t, q, &[VizType::Line, VizType::Scatter])?;
            for &agg_fn in self.agg_fns {
                self.bin_aggregate(t, q, agg_fn, &[VizType::Line, VizType::Bar])?;
            }
            Ok(())
        } else {
            self.value_aggregates(t, q, |_| TREND_VIZ)?;
            self.value_box(t, q)
        }
    }

    pub(crate) fn c_c_q(&mut self, a: &FieldSchema, b: &FieldSchema, q: &FieldSchema) -> Result<()> {
        if a.is_unique || b.is_unique {
            return Ok(());
        }
        let groups = [GroupKey::plain(a.id), GroupKey::plain(b.id)];
        self.multigroup_aggregates(a, b, groups, q, &[VizType::StackedBar, VizType::Grid])
    }

    pub(crate) fn c_multi_q(&mut self, c: &FieldSchema, qs: &[&FieldSchema]) -> Result<()> {
        if c.is_unique || qs.len() < 2 {
            return Ok(());
        }
        self.multi_aggregates(c, GroupKey::plain(c.id), qs, &[VizType::Bar])?;

        for (i, x) in qs.iter().enumerate() {
            for y in &qs[i + 1..] {
                for &agg_fn in self.agg_fns {
                    let meta = SpecMetaBuilder::new()
                        .text(format!("{} of", title(agg_fn)))
                        .field(x)
                        .text("vs.")
                        .field(y)
                        .text("by")
                        .field(c)
                        .labels(aggregate_label(agg_fn, x), aggregate_label(agg_fn, y))
                        .build();
                    self.emit(
                        SpecArgs::AggregateAggregate {
                            group: c.id,
                            x: x.id,
                            y: y.id,
                            agg_fn,
                        },
                        TypeStructure::AggAgg,
                        &[VizType::Scatter],
                        meta,
                    )?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn t_multi_q(&mut self, t: &FieldSchema, qs: &[&FieldSchema]) -> Result<()> {
        if qs.len() < 2 {
            return Ok(());
        }
        self.multi_aggregates(t, group_key(t), qs, &[VizType::Line])
    }

    pub(crate) fn c_t_q(&mut self, c: &FieldSchema, t: &FieldSchema, q: &FieldSchema) -> Result<()> {
        if c.is_unique {
            return Ok(());
        }
        let groups = [GroupKey::plain(c.id), group_key(t)];
        self.multigroup_aggregates(c, t, groups, q, &[VizType::Line, VizType::StackedBar])
    }
}
