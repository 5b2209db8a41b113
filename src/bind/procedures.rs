//! One data-shaping handler per generating procedure
//!
//! Every handler reads from a filtered [`Frame`] and returns a [`Shaped`]
//! result; the binder then projects it onto the requested output formats.

use serde_json::Value as Json;

use crate::aggregation::AggFn;
use crate::bind::frame::Frame;
use crate::bind::output::ScoreSeries;
use crate::binning::{compute_bins, BinKind, Bins};
use crate::config::BinningConfig;
use crate::error::{Error, Result};
use crate::field::{FieldId, Scale};
use crate::groupby::{GroupAggregate, GroupBy};
use crate::spec::{GroupKey, SpecArgs};
use crate::stats;
use crate::table::Value;

/// Procedure output before format selection
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Shaped {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Json>>,
    /// Visualize-only confidence interval columns
    pub interval_columns: Vec<String>,
    /// Row-aligned with `rows` when `interval_columns` is non-empty
    pub interval_rows: Vec<Vec<Json>>,
    pub score: ScoreSeries,
}

impl Shaped {
    fn new(columns: Vec<String>) -> Self {
        Shaped {
            columns,
            ..Shaped::default()
        }
    }

    /// Header row followed by data rows, interval columns appended
    pub(crate) fn visualize(&self) -> Vec<Vec<Json>> {
        let header = self
            .columns
            .iter()
            .chain(&self.interval_columns)
            .map(|c| Json::from(c.as_str()))
            .collect();

        std::iter::once(header)
            .chain(self.rows.iter().enumerate().map(|(i, row)| {
                row.iter()
                    .chain(self.interval_rows.get(i).into_iter().flatten())
                    .cloned()
                    .collect()
            }))
            .collect()
    }
}

/// Group key of one row: a bin index or a raw cell
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    Bin(usize),
    Value(Value),
}

/// Per-row keys of one grouping field, with the bins used if any
struct KeyColumn {
    name: String,
    keys: Vec<KeyPart>,
    bins: Option<Bins>,
}

impl KeyColumn {
    fn resolve(frame: &Frame<'_>, key: GroupKey, binning: &BinningConfig) -> Result<Self> {
        let field = frame.field(key.field)?;
        if !key.binned {
            let keys = frame
                .cells(key.field)?
                .into_iter()
                .map(|v| KeyPart::Value(v.clone()))
                .collect();
            return Ok(KeyColumn {
                name: field.name.clone(),
                keys,
                bins: None,
            });
        }

        let kind = if field.is_temporal() {
            BinKind::Temporal
        } else {
            BinKind::Quantitative
        };
        let values = frame.numbers(key.field)?;
        let bins = compute_bins(&values, kind, binning)?;
        let keys = values
            .iter()
            .map(|&v| {
                bins.digitize(v).map(KeyPart::Bin).ok_or_else(|| {
                    Error::StatisticalComputation(format!(
                        "value {} of '{}' falls outside its bins",
                        v, field.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(KeyColumn {
            name: field.name.clone(),
            keys,
            bins: Some(bins),
        })
    }

    fn label(&self, part: &KeyPart) -> Json {
        match (part, &self.bins) {
            (KeyPart::Bin(i), Some(bins)) => Json::from(bins.label(*i)),
            (KeyPart::Bin(i), None) => Json::from(*i),
            (KeyPart::Value(v), _) => v.to_json(),
        }
    }

    fn group_by(&self) -> GroupBy<KeyPart> {
        GroupBy::new(self.keys.iter().cloned().map(Some).collect())
    }
}

fn aggregate_column(frame: &Frame<'_>, agg_fn: AggFn, field: FieldId) -> Result<String> {
    Ok(format!("{}({})", agg_fn, frame.field(field)?.name))
}

/// Rows of `key labels + aggregate`, with intervals for `mean`
fn aggregate_shape<K>(
    aggregates: Vec<GroupAggregate<K>>,
    agg_fn: AggFn,
    columns: Vec<String>,
    label: impl Fn(&K) -> Vec<Json>,
) -> Shaped {
    let mut shaped = Shaped::new(columns);
    let with_interval = agg_fn.has_interval();
    if with_interval {
        shaped.interval_columns = vec![ScoreSeries::LOWER.into(), ScoreSeries::UPPER.into()];
    }

    let mut agg = Vec::with_capacity(aggregates.len());
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    for group in &aggregates {
        let mut row = label(&group.key);
        row.push(Json::from(group.value));
        shaped.rows.push(row);
        agg.push(group.value);

        if with_interval {
            match group.interval {
                Some((l, u)) => {
                    shaped.interval_rows.push(vec![Json::from(l), Json::from(u)]);
                    lower.push(l);
                    upper.push(u);
                }
                None => shaped.interval_rows.push(vec![Json::Null, Json::Null]),
            }
        }
    }

    let complete = lower.len() == agg.len();
    shaped.score.insert(ScoreSeries::AGG, agg);
    if with_interval && complete {
        shaped.score.insert(ScoreSeries::LOWER, lower);
        shaped.score.insert(ScoreSeries::UPPER, upper);
    }
    shaped
}

/// Shape the frame according to the spec's procedure
pub(crate) fn shape(args: &SpecArgs, frame: &Frame<'_>, binning: &BinningConfig) -> Result<Shaped> {
    match args {
        SpecArgs::IndValue { index, value } => ind_value(frame, *index, *value),
        SpecArgs::ValueCount { field } => value_count(frame, *field),
        SpecArgs::BinAggregate { bin, agg, agg_fn } => {
            bin_aggregate(frame, *bin, *agg, *agg_fn, binning)
        }
        SpecArgs::ValueAggregate { group, agg, agg_fn } => {
            value_aggregate(frame, *group, *agg, *agg_fn)
        }
        SpecArgs::ValueBox { group, value } => value_box(frame, *group, *value),
        SpecArgs::ValueValue { x, y } => value_value(frame, *x, *y),
        SpecArgs::MultigroupAggregate {
            groups,
            agg,
            agg_fn,
        } => multigroup_aggregate(frame, groups, *agg, *agg_fn, binning),
        SpecArgs::MultigroupCount { groups } => multigroup_count(frame, groups, binning),
        SpecArgs::MultiAggregate { group, aggs, agg_fn } => {
            multi_aggregate(frame, *group, aggs, *agg_fn, binning)
        }
        SpecArgs::AggregateAggregate { group, x, y, agg_fn } => {
            aggregate_aggregate(frame, *group, *x, *y, *agg_fn)
        }
    }
}

fn ind_value(frame: &Frame<'_>, index: FieldId, value: FieldId) -> Result<Shaped> {
    let labels = frame.cells(index)?;
    let values = frame.numbers(value)?;

    let mut shaped = Shaped::new(vec![
        frame.field(index)?.name.clone(),
        frame.field(value)?.name.clone(),
    ]);
    shaped.rows = labels
        .iter()
        .zip(&values)
        .map(|(label, &v)| vec![label.to_json(), Json::from(v)])
        .collect();
    shaped.score.insert(ScoreSeries::VAL, values);
    Ok(shaped)
}

fn value_count(frame: &Frame<'_>, field: FieldId) -> Result<Shaped> {
    let schema = frame.field(field)?;
    let group_by = GroupBy::new(frame.cells(field)?.into_iter().map(|v| Some(v.clone())).collect());

    let mut counts = group_by.size();
    // Nominal values read best by frequency; ordered scales keep key order
    if schema.scale == Scale::Nominal {
        counts.sort_by(|a, b| b.1.cmp(&a.1));
    }

    let mut shaped = Shaped::new(vec![schema.name.clone(), ScoreSeries::COUNT.to_string()]);
    shaped.rows = counts
        .iter()
        .map(|(key, count)| vec![key.to_json(), Json::from(*count)])
        .collect();
    shaped.score.insert(
        ScoreSeries::COUNT,
        counts.iter().map(|(_, count)| *count as f64).collect(),
    );
    Ok(shaped)
}

fn bin_aggregate(
    frame: &Frame<'_>,
    bin: FieldId,
    agg: FieldId,
    agg_fn: AggFn,
    binning: &BinningConfig,
) -> Result<Shaped> {
    let key = KeyColumn::resolve(frame, GroupKey::binned(bin), binning)?;
    let num_bins = key.bins.as_ref().map(Bins::len).unwrap_or(0);
    let values = frame.numbers(agg)?;
    let mut aggregates = key.group_by().aggregate(&values, agg_fn)?.into_iter().peekable();

    // Every bin appears for additive functions; empty bins have no mean
    let mut padded = Vec::with_capacity(num_bins);
    for i in 0..num_bins {
        match aggregates.next_if(|g| g.key == KeyPart::Bin(i)) {
            Some(group) => padded.push(group),
            None if matches!(agg_fn, AggFn::Count | AggFn::Sum) => padded.push(GroupAggregate {
                key: KeyPart::Bin(i),
                value: 0.0,
                interval: None,
            }),
            None => {}
        }
    }

    let columns = vec![key.name.clone(), aggregate_column(frame, agg_fn, agg)?];
    Ok(aggregate_shape(padded, agg_fn, columns, |k| vec![key.label(k)]))
}

fn value_aggregate(frame: &Frame<'_>, group: FieldId, agg: FieldId, agg_fn: AggFn) -> Result<Shaped> {
    let key = KeyColumn::resolve(frame, GroupKey::plain(group), &BinningConfig::default())?;
    let aggregates = key.group_by().aggregate(&frame.numbers(agg)?, agg_fn)?;

    let columns = vec![key.name.clone(), aggregate_column(frame, agg_fn, agg)?];
    Ok(aggregate_shape(aggregates, agg_fn, columns, |k| vec![key.label(k)]))
}

fn value_box(frame: &Frame<'_>, group: FieldId, value: FieldId) -> Result<Shaped> {
    let key = KeyColumn::resolve(frame, GroupKey::plain(group), &BinningConfig::default())?;
    let groups = key.group_by().collect(&frame.numbers(value)?)?;

    let mut shaped = Shaped::new(
        std::iter::once(key.name.clone())
            .chain(["min", "q1", "median", "q3", "max", "mean"].map(String::from))
            .collect(),
    );
    for (part, values) in groups {
        let summary = stats::describe(&values)?;
        let label = key.label(&part);
        shaped.rows.push(vec![
            label.clone(),
            Json::from(summary.min),
            Json::from(summary.q1),
            Json::from(summary.median),
            Json::from(summary.q3),
            Json::from(summary.max),
            Json::from(summary.mean),
        ]);
        let name = match label {
            Json::String(s) => s,
            other => other.to_string(),
        };
        shaped.score.insert(name, values);
    }
    Ok(shaped)
}

fn value_value(frame: &Frame<'_>, x: FieldId, y: FieldId) -> Result<Shaped> {
    let x_cells = frame.cells(x)?;
    let y_cells = frame.cells(y)?;
    let x_values = frame.numbers(x)?;
    let y_values = frame.numbers(y)?;

    let mut order: Vec<usize> = (0..x_values.len()).collect();
    order.sort_by(|&a, &b| x_values[a].total_cmp(&x_values[b]));

    let mut shaped = Shaped::new(vec![frame.field(x)?.name.clone(), frame.field(y)?.name.clone()]);
    shaped.rows = order
        .iter()
        .map(|&i| vec![x_cells[i].to_json(), y_cells[i].to_json()])
        .collect();
    shaped.score.insert(ScoreSeries::X, order.iter().map(|&i| x_values[i]).collect());
    shaped.score.insert(ScoreSeries::Y, order.iter().map(|&i| y_values[i]).collect());
    Ok(shaped)
}

fn paired_group_by(first: &KeyColumn, second: &KeyColumn) -> GroupBy<(KeyPart, KeyPart)> {
    GroupBy::new(
        first
            .keys
            .iter()
            .cloned()
            .zip(second.keys.iter().cloned())
            .map(Some)
            .collect(),
    )
}

fn multigroup_count(frame: &Frame<'_>, groups: &[GroupKey; 2], binning: &BinningConfig) -> Result<Shaped> {
    let first = KeyColumn::resolve(frame, groups[0], binning)?;
    let second = KeyColumn::resolve(frame, groups[1], binning)?;
    let counts = paired_group_by(&first, &second).size();

    let mut shaped = Shaped::new(vec![
        first.name.clone(),
        second.name.clone(),
        ScoreSeries::COUNT.to_string(),
    ]);
    shaped.rows = counts
        .iter()
        .map(|((a, b), count)| vec![first.label(a), second.label(b), Json::from(*count)])
        .collect();
    shaped.score.insert(
        ScoreSeries::COUNT,
        counts.iter().map(|(_, count)| *count as f64).collect(),
    );
    Ok(shaped)
}

fn multigroup_aggregate(
    frame: &Frame<'_>,
    groups: &[GroupKey; 2],
    agg: FieldId,
    agg_fn: AggFn,
    binning: &BinningConfig,
) -> Result<Shaped> {
    let first = KeyColumn::resolve(frame, groups[0], binning)?;
    let second = KeyColumn::resolve(frame, groups[1], binning)?;
    let aggregates = paired_group_by(&first, &second).aggregate(&frame.numbers(agg)?, agg_fn)?;

    let columns = vec![
        first.name.clone(),
        second.name.clone(),
        aggregate_column(frame, agg_fn, agg)?,
    ];
    Ok(aggregate_shape(aggregates, agg_fn, columns, |(a, b)| {
        vec![first.label(a), second.label(b)]
    }))
}

fn multi_aggregate(
    frame: &Frame<'_>,
    group: GroupKey,
    aggs: &[FieldId],
    agg_fn: AggFn,
    binning: &BinningConfig,
) -> Result<Shaped> {
    let key = KeyColumn::resolve(frame, group, binning)?;
    let group_by = key.group_by();

    let mut per_field = Vec::with_capacity(aggs.len());
    for &field in aggs {
        let column = aggregate_column(frame, agg_fn, field)?;
        per_field.push((column, group_by.aggregate(&frame.numbers(field)?, agg_fn)?));
    }

    let mut shaped = Shaped::new(
        std::iter::once(key.name.clone())
            .chain(per_field.iter().map(|(column, _)| column.clone()))
            .collect(),
    );
    if agg_fn.has_interval() {
        for (column, _) in &per_field {
            shaped.interval_columns.push(format!("{}:{}", ScoreSeries::LOWER, column));
            shaped.interval_columns.push(format!("{}:{}", ScoreSeries::UPPER, column));
        }
    }

    for (i, (part, _)) in group_by.groups().enumerate() {
        let mut row = vec![key.label(part)];
        let mut interval_row = Vec::new();
        for (_, aggregates) in &per_field {
            let group = &aggregates[i];
            row.push(Json::from(group.value));
            if agg_fn.has_interval() {
                let (l, u) = group
                    .interval
                    .map(|(l, u)| (Json::from(l), Json::from(u)))
                    .unwrap_or((Json::Null, Json::Null));
                interval_row.extend([l, u]);
            }
        }
        shaped.rows.push(row);
        if agg_fn.has_interval() {
            shaped.interval_rows.push(interval_row);
        }
    }

    for (column, aggregates) in per_field {
        shaped.score.insert(column, aggregates.iter().map(|g| g.value).collect());
    }
    Ok(shaped)
}

fn aggregate_aggregate(
    frame: &Frame<'_>,
    group: FieldId,
    x: FieldId,
    y: FieldId,
    agg_fn: AggFn,
) -> Result<Shaped> {
    let key = KeyColumn::resolve(frame, GroupKey::plain(group), &BinningConfig::default())?;
    let group_by = key.group_by();
    let x_aggregates = group_by.aggregate(&frame.numbers(x)?, agg_fn)?;
    let y_aggregates = group_by.aggregate(&frame.numbers(y)?, agg_fn)?;

    let mut shaped = Shaped::new(vec![
        key.name.clone(),
        aggregate_column(frame, agg_fn, x)?,
        aggregate_column(frame, agg_fn, y)?,
    ]);
    shaped.rows = x_aggregates
        .iter()
        .zip(&y_aggregates)
        .map(|(gx, gy)| vec![key.label(&gx.key), Json::from(gx.value), Json::from(gy.value)])
        .collect();
    shaped
        .score
        .insert(ScoreSeries::X, x_aggregates.iter().map(|g| g.value).collect());
    shaped
        .score
        .insert(ScoreSeries::Y, y_aggregates.iter().map(|g| g.value).collect());
    Ok(shaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::conditionals::Conditionals;
    use crate::field::{FieldSchema, FieldSet};
    use crate::table::{Column, DataTable};

    fn fixture() -> (DataTable, FieldSet) {
        let table = DataTable::new(vec![
            Column::text("dept", vec!["eng", "ops", "eng", "hr", "eng", "ops"]),
            Column::text("site", vec!["a", "a", "b", "b", "a", "b"]),
            Column::numeric("salary", vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]),
            Column::numeric("age", vec![25, 35, 45, 55, 30, 40]),
        ])
        .unwrap();
        let fields = FieldSet::new(vec![
            FieldSchema::categorical(1, "dept"),
            FieldSchema::categorical(2, "site"),
            FieldSchema::quantitative(3, "salary"),
            FieldSchema::quantitative(4, "age"),
        ])
        .unwrap();
        (table, fields)
    }

    fn run(args: SpecArgs, binning: &BinningConfig) -> Shaped {
        let (table, fields) = fixture();
        let ids = args.referenced_fields();
        let frame = Frame::new(&table, &fields, &ids, &Conditionals::none()).unwrap();
        shape(&args, &frame, binning).unwrap()
    }

    #[test]
    fn test_value_count_orders_by_frequency() {
        let shaped = run(SpecArgs::ValueCount { field: FieldId(1) }, &BinningConfig::default());
        assert_eq!(shaped.columns, vec!["dept", "count"]);
        assert_eq!(shaped.rows[0], vec![Json::from("eng"), Json::from(3)]);
        assert_eq!(shaped.rows[1], vec![Json::from("ops"), Json::from(2)]);
        assert_eq!(shaped.score.get(ScoreSeries::COUNT), Some(&[3.0, 2.0, 1.0][..]));
    }

    #[test]
    fn test_bin_aggregate_count_pads_empty_bins() {
        let args = SpecArgs::BinAggregate {
            bin: FieldId(3),
            agg: FieldId(3),
            agg_fn: AggFn::Count,
        };
        let shaped = run(args, &BinningConfig::explicit(10));
        let counts = shaped.score.get(ScoreSeries::AGG).unwrap();
        assert_eq!(counts.len(), 10);
        assert_eq!(counts.iter().sum::<f64>(), 6.0);
        assert_eq!(shaped.columns, vec!["salary", "count(salary)"]);
        assert!(shaped.interval_columns.is_empty());
    }

    #[test]
    fn test_value_aggregate_mean_has_intervals() {
        let args = SpecArgs::ValueAggregate {
            group: FieldId(1),
            agg: FieldId(3),
            agg_fn: AggFn::Mean,
        };
        let shaped = run(args, &BinningConfig::default());
        // eng, hr, ops in key order
        assert_eq!(shaped.score.get(ScoreSeries::AGG), Some(&[30.0, 40.0, 40.0][..]));
        assert_eq!(shaped.interval_columns, vec!["lower", "upper"]);
        // hr has a single row and no standard error
        assert_eq!(shaped.interval_rows[1], vec![Json::Null, Json::Null]);
        assert!(shaped.score.get(ScoreSeries::LOWER).is_none());

        let visualize = shaped.visualize();
        assert_eq!(visualize[0].len(), 4);
        assert_eq!(visualize.len(), 4);
    }

    #[test]
    fn test_value_box_rows() {
        let args = SpecArgs::ValueBox {
            group: FieldId(2),
            value: FieldId(3),
        };
        let shaped = run(args, &BinningConfig::default());
        assert_eq!(shaped.columns.len(), 7);
        assert_eq!(shaped.rows.len(), 2);
        assert_eq!(shaped.rows[0][0], Json::from("a"));
        assert_eq!(shaped.rows[0][3], Json::from(20.0));
    }

    #[test]
    fn test_value_value_sorted_by_x() {
        let args = SpecArgs::ValueValue {
            x: FieldId(4),
            y: FieldId(3),
        };
        let shaped = run(args, &BinningConfig::default());
        let (x, y) = shaped.score.bivariate().unwrap();
        assert_eq!(x, &[25.0, 30.0, 35.0, 40.0, 45.0, 55.0]);
        assert_eq!(y, &[10.0, 50.0, 20.0, 60.0, 30.0, 40.0]);
    }

    #[test]
    fn test_multigroup_count() {
        let args = SpecArgs::MultigroupCount {
            groups: [GroupKey::plain(FieldId(1)), GroupKey::plain(FieldId(2))],
        };
        let shaped = run(args, &BinningConfig::default());
        let total: f64 = shaped.score.get(ScoreSeries::COUNT).unwrap().iter().sum();
        assert_eq!(total, 6.0);
        assert_eq!(
            shaped.rows[0],
            vec![Json::from("eng"), Json::from("a"), Json::from(2)]
        );
    }

    #[test]
    fn test_multi_aggregate_columns() {
        let args = SpecArgs::MultiAggregate {
            group: GroupKey::plain(FieldId(2)),
            aggs: vec![FieldId(3), FieldId(4)],
            agg_fn: AggFn::Mean,
        };
        let shaped = run(args, &BinningConfig::default());
        assert_eq!(shaped.columns, vec!["site", "mean(salary)", "mean(age)"]);
        assert_eq!(shaped.interval_columns.len(), 4);
        assert_eq!(shaped.rows.len(), 2);
        assert_eq!(shaped.interval_rows[0].len(), 4);
    }

    #[test]
    fn test_aggregate_aggregate() {
        let args = SpecArgs::AggregateAggregate {
            group: FieldId(2),
            x: FieldId(3),
            y: FieldId(4),
            agg_fn: AggFn::Sum,
        };
        let shaped = run(args, &BinningConfig::default());
        let (x, y) = shaped.score.bivariate().unwrap();
        assert_eq!(x, &[80.0, 130.0]);
        assert_eq!(y, &[90.0, 140.0]);
    }

    #[test]
    fn test_binned_multigroup_aggregate() {
        let args = SpecArgs::MultigroupAggregate {
            groups: [GroupKey::plain(FieldId(2)), GroupKey::binned(FieldId(4))],
            agg: FieldId(3),
            agg_fn: AggFn::Max,
        };
        let shaped = run(args, &BinningConfig::explicit(2));
        assert!(shaped.rows.iter().all(|row| row[1].is_string()));
        assert_eq!(shaped.columns[2], "max(salary)");
    }
}
