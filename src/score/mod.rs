//! Spec scoring
//!
//! Every scored spec carries a relevance score first. Specs with a single
//! aggregated or counted series also get the univariate battery, raw
//! value-vs-value specs get a correlation. A metric that cannot be computed
//! is kept with a `null` score.

use thiserror::Error;

use crate::bind::ScoreSeries;
use crate::error::Error;
use crate::field::FieldId;
use crate::spec::{BoundSpec, Score, ScoreType, ScoredSpec, TypeStructure};
use crate::stats;

/// Failure of a single metric
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("no score series available")]
    MissingSeries,

    #[error("non-finite result")]
    NonFinite,

    #[error("{0}")]
    Computation(String),
}

impl From<Error> for ScoreError {
    fn from(err: Error) -> Self {
        ScoreError::Computation(err.to_string())
    }
}

pub type ScoreResult = std::result::Result<f64, ScoreError>;

fn finite(value: f64) -> ScoreResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoreError::NonFinite)
    }
}

/// Share of the selected fields a spec uses, in `[0, 1]`
pub fn relevance(field_ids: &[FieldId], selected: &[FieldId]) -> f64 {
    let mut selected: Vec<FieldId> = selected.to_vec();
    selected.sort();
    selected.dedup();
    if selected.is_empty() {
        return 0.0;
    }

    let used = selected.iter().filter(|id| field_ids.contains(id)).count();
    used as f64 / selected.len() as f64
}

/// Shannon entropy (natural log) of the series read as a distribution
pub fn entropy(values: &[f64]) -> ScoreResult {
    finite(stats::entropy(values)?)
}

/// Entropy divided by its maximum `ln n`
pub fn normalized_entropy(values: &[f64]) -> ScoreResult {
    if values.len() < 2 {
        return Err(ScoreError::Computation(
            "normalized entropy needs at least two values".into(),
        ));
    }
    finite(entropy(values)? / (values.len() as f64).ln())
}

/// Population variance divided by the maximum value
pub fn normalized_variance(values: &[f64]) -> ScoreResult {
    let variance = stats::variance(values, 0)?;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    finite(variance / max)
}

pub fn gini(values: &[f64]) -> ScoreResult {
    finite(stats::gini(values)?)
}

/// Pearson correlation of two series
pub fn correlation(x: &[f64], y: &[f64]) -> ScoreResult {
    finite(stats::correlation(x, y)?)
}

fn to_score(score_type: ScoreType, result: ScoreResult) -> Score {
    Score {
        score_type,
        score: result.ok(),
    }
}

fn univariate(series: Option<&ScoreSeries>) -> Vec<Score> {
    let values = series.and_then(ScoreSeries::univariate);
    let metric = |f: fn(&[f64]) -> ScoreResult| values.ok_or(ScoreError::MissingSeries).and_then(f);

    vec![
        to_score(ScoreType::Entropy, metric(entropy)),
        to_score(ScoreType::NormalizedEntropy, metric(normalized_entropy)),
        to_score(ScoreType::NormalizedVariance, metric(normalized_variance)),
        to_score(ScoreType::Gini, metric(gini)),
        to_score(
            ScoreType::Size,
            values.map(|v| v.len() as f64).ok_or(ScoreError::MissingSeries),
        ),
    ]
}

fn bivariate(series: Option<&ScoreSeries>) -> Vec<Score> {
    let result = series
        .and_then(ScoreSeries::bivariate)
        .ok_or(ScoreError::MissingSeries)
        .and_then(|(x, y)| correlation(x, y));
    vec![to_score(ScoreType::Correlation, result)]
}

/// Attach scores to a bound spec; never fails
pub fn score(bound: BoundSpec, selected: &[FieldId]) -> ScoredSpec {
    let mut scores = vec![Score {
        score_type: ScoreType::Relevance,
        score: Some(relevance(&bound.candidate.field_ids, selected)),
    }];

    let series = bound.data.score.as_ref();
    match bound.candidate.type_structure {
        TypeStructure::CQ | TypeStructure::BQ | TypeStructure::CCQ => {
            scores.extend(univariate(series))
        }
        TypeStructure::QQ => scores.extend(bivariate(series)),
        TypeStructure::CBox | TypeStructure::CMultiQ | TypeStructure::AggAgg => {}
    }

    ScoredSpec { bound, scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::BoundData;
    use crate::spec::{RecommendationType, SpecArgs, SpecCandidate, SpecMeta, VizType};

    fn bound(args: SpecArgs, structure: TypeStructure, series: Option<ScoreSeries>) -> BoundSpec {
        let candidate = SpecCandidate::new(
            args,
            structure,
            [VizType::Bar],
            SpecMeta::default(),
            RecommendationType::Exact,
        )
        .unwrap();
        BoundSpec {
            candidate,
            data: BoundData {
                score: series,
                ..BoundData::default()
            },
        }
    }

    #[test]
    fn test_relevance() {
        let ids = [FieldId(1), FieldId(2)];
        assert_eq!(relevance(&ids, &[]), 0.0);
        assert_eq!(relevance(&ids, &[FieldId(1)]), 1.0);
        assert_eq!(relevance(&ids, &[FieldId(1), FieldId(3)]), 0.5);
        assert_eq!(relevance(&ids, &[FieldId(3), FieldId(3)]), 0.0);
    }

    #[test]
    fn test_univariate_battery() {
        let spec = bound(
            SpecArgs::ValueCount { field: FieldId(1) },
            TypeStructure::CQ,
            Some(ScoreSeries::new().with(ScoreSeries::COUNT, vec![2.0, 2.0])),
        );
        let scored = score(spec, &[FieldId(1)]);

        assert_eq!(scored.scores[0].score_type, ScoreType::Relevance);
        assert_eq!(scored.relevance(), 1.0);
        let entropy = scored.score(ScoreType::Entropy).unwrap();
        assert!((entropy - 2f64.ln()).abs() < 1e-12);
        assert!((scored.score(ScoreType::NormalizedEntropy).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(scored.score(ScoreType::NormalizedVariance), Some(0.0));
        assert_eq!(scored.score(ScoreType::Gini), Some(0.0));
        assert_eq!(scored.score(ScoreType::Size), Some(2.0));
    }

    #[test]
    fn test_failed_metrics_are_null() {
        // Negative aggregates break entropy and gini; a zero max breaks the variance ratio
        let spec = bound(
            SpecArgs::ValueCount { field: FieldId(1) },
            TypeStructure::CQ,
            Some(ScoreSeries::new().with(ScoreSeries::AGG, vec![-1.0, 0.0])),
        );
        let scored = score(spec, &[]);

        assert_eq!(scored.scores.len(), 6);
        let entropy = scored
            .scores
            .iter()
            .find(|s| s.score_type == ScoreType::Entropy)
            .unwrap();
        assert_eq!(entropy.score, None);
        assert_eq!(scored.score(ScoreType::Gini), None);
        assert_eq!(scored.score(ScoreType::NormalizedVariance), None);
        assert_eq!(scored.score(ScoreType::Size), Some(2.0));
    }

    #[test]
    fn test_bivariate_correlation() {
        let spec = bound(
            SpecArgs::ValueValue {
                x: FieldId(1),
                y: FieldId(2),
            },
            TypeStructure::QQ,
            Some(
                ScoreSeries::new()
                    .with(ScoreSeries::X, vec![1.0, 2.0, 3.0])
                    .with(ScoreSeries::Y, vec![2.0, 4.0, 6.0]),
            ),
        );
        let scored = score(spec, &[FieldId(2)]);
        assert_eq!(scored.scores.len(), 2);
        assert!((scored.score(ScoreType::Correlation).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(scored.relevance(), 1.0);
    }

    #[test]
    fn test_missing_series_keeps_metric_slots() {
        let spec = bound(
            SpecArgs::ValueValue {
                x: FieldId(1),
                y: FieldId(2),
            },
            TypeStructure::QQ,
            None,
        );
        let scored = score(spec, &[]);
        assert_eq!(scored.scores.len(), 2);
        assert_eq!(scored.score(ScoreType::Correlation), None);
    }
}
