//! Binning of continuous quantitative and temporal values
//!
//! Bins are right-open: bin `i` holds values in `[edges[i], edges[i + 1])`.
//! The last edge is nudged past the maximum (`+0.0001 × |max|` for numbers,
//! `+1 ms` for timestamps) so the maximum lands in the last bin.

use chrono::DateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::BinningConfig;
use crate::error::{Error, Result};
use crate::stats;

/// Relative nudge applied to the last quantitative edge
pub const QUANTITATIVE_EDGE_NUDGE: f64 = 0.0001;

/// Nudge applied to the last temporal edge, in milliseconds
pub const TEMPORAL_EDGE_NUDGE_MS: f64 = 1.0;

/// Rule used to derive a bin count from the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinningProcedure {
    /// `width = 2 · IQR · n^(-1/3)`
    #[default]
    FreedmanDiaconis,
    /// `ceil(log2 n) + 1`
    Sturges,
    /// `width = 3.5 · σ · n^(-1/3)`
    Scott,
    /// `ceil(sqrt n)`
    SquareRoot,
    /// `ceil(2 · n^(1/3))`
    Rice,
}

/// What the binned values represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinKind {
    Quantitative,
    /// Epoch milliseconds
    Temporal,
}

/// Computed bins for one field
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    edges: Vec<f64>,
    precision: u32,
    kind: BinKind,
}

impl Bins {
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn kind(&self) -> BinKind {
        self.kind
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the bin holding `value`, if any
    pub fn digitize(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let idx = self.edges.partition_point(|&e| e <= value);
        if idx == 0 || idx > self.len() {
            None
        } else {
            Some(idx - 1)
        }
    }

    /// `(left, right)` edges of bin `i`
    pub fn bounds(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.edges.get(i)?, *self.edges.get(i + 1)?))
    }

    /// Human-readable label of bin `i`
    pub fn label(&self, i: usize) -> String {
        let Some((left, right)) = self.bounds(i) else {
            return String::new();
        };
        match self.kind {
            BinKind::Quantitative => {
                let p = self.precision as usize;
                format!("[{:.p$}, {:.p$})", left, right, p = p)
            }
            BinKind::Temporal => {
                let span = self.edges[self.edges.len() - 1] - self.edges[0];
                format!("[{}, {})", format_millis(left, span), format_millis(right, span))
            }
        }
    }

    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }
}

fn format_millis(ms: f64, span_ms: f64) -> String {
    const DAY_MS: f64 = 86_400_000.0;
    match DateTime::from_timestamp_millis(ms.round() as i64) {
        Some(dt) if span_ms >= 2.0 * DAY_MS => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{}", ms),
    }
}

/// Count the decimal places of a value's shortest representation
fn decimal_places(value: f64) -> u32 {
    let repr = format!("{}", value);
    repr.split_once('.')
        .map(|(_, frac)| frac.trim_end_matches('0').len() as u32)
        .unwrap_or(0)
}

/// Infer label precision from a bounded, deterministic sample
///
/// Returns the largest number of decimal places seen in the sample, capped at
/// `max_precision`.
pub fn infer_precision(values: &[f64], max_sample: usize, max_precision: u32) -> u32 {
    let inferred = if values.len() <= max_sample {
        values.iter().map(|&v| decimal_places(v)).max()
    } else {
        let mut rng = StdRng::seed_from_u64(values.len() as u64);
        rand::seq::index::sample(&mut rng, values.len(), max_sample)
            .into_iter()
            .map(|i| decimal_places(values[i]))
            .max()
    };
    inferred.unwrap_or(0).min(max_precision)
}

/// Bin count for `values` under `config`
///
/// An explicit `num_bins` is used as given. Procedural counts are clamped to
/// `[min_bins, max_bins]`.
pub fn bin_count(values: &[f64], config: &BinningConfig) -> Result<usize> {
    if values.is_empty() {
        return Err(Error::EmptyData("cannot bin an empty series".into()));
    }

    if let Some(explicit) = config.num_bins {
        return Ok(explicit);
    }

    let described = stats::describe(values)?;
    let n = values.len() as f64;
    let range = described.max - described.min;

    let raw = match config.procedure {
        BinningProcedure::FreedmanDiaconis => range / (2.0 * described.iqr() * n.powf(-1.0 / 3.0)),
        BinningProcedure::Scott => range / (3.5 * described.std * n.powf(-1.0 / 3.0)),
        BinningProcedure::Sturges => n.log2().ceil() + 1.0,
        BinningProcedure::SquareRoot => n.sqrt(),
        BinningProcedure::Rice => 2.0 * n.cbrt(),
    };

    let count = if raw.is_nan() || range == 0.0 {
        config.min_bins
    } else if raw.is_infinite() {
        // Zero spread with non-zero range: as fine as allowed
        config.max_bins
    } else {
        raw.ceil() as usize
    };

    Ok(count.clamp(config.min_bins, config.max_bins))
}

/// `num_bins + 1` linearly spaced edges over `[min, max]`, last edge nudged
pub fn bin_edges(min: f64, max: f64, num_bins: usize, kind: BinKind) -> Vec<f64> {
    let num_bins = if max > min { num_bins.max(1) } else { 1 };
    let width = (max - min) / num_bins as f64;

    let mut edges: Vec<f64> = (0..num_bins).map(|i| min + i as f64 * width).collect();
    edges.push(max + edge_nudge(max, kind));
    edges
}

fn edge_nudge(max: f64, kind: BinKind) -> f64 {
    match kind {
        BinKind::Temporal => TEMPORAL_EDGE_NUDGE_MS,
        BinKind::Quantitative if max == 0.0 => QUANTITATIVE_EDGE_NUDGE,
        BinKind::Quantitative => QUANTITATIVE_EDGE_NUDGE * max.abs(),
    }
}

/// Compute bins for a series of finite values
pub fn compute_bins(values: &[f64], kind: BinKind, config: &BinningConfig) -> Result<Bins> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput("cannot bin non-finite values".into()));
    }

    let num_bins = bin_count(values, config)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let precision = match (config.precision, kind) {
        (Some(p), _) => p,
        (None, BinKind::Temporal) => 0,
        (None, BinKind::Quantitative) => {
            infer_precision(values, config.max_sample, config.max_precision)
        }
    };

    Ok(Bins {
        edges: bin_edges(min, max, num_bins, kind),
        precision,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(|v| v as f64).collect()
    }

    #[test]
    fn test_explicit_five_bins() {
        let values = one_to_ten();
        let bins = compute_bins(&values, BinKind::Quantitative, &BinningConfig::explicit(5)).unwrap();
        let edges = bins.edges();

        assert_eq!(edges.len(), 6);
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert!(edges[0] <= 1.0);
        assert!(edges[5] >= 10.0);
        assert_eq!(bins.digitize(1.0), Some(0));
        assert_eq!(bins.digitize(10.0), Some(4));
        assert_eq!(bins.digitize(10.5), None);
        assert_eq!(bins.digitize(0.5), None);
    }

    #[test]
    fn test_max_nudge() {
        let edges = bin_edges(0.0, 100.0, 4, BinKind::Quantitative);
        assert_eq!(&edges[..4], &[0.0, 25.0, 50.0, 75.0]);
        assert!((edges[4] - 100.01).abs() < 1e-9);

        let edges = bin_edges(-10.0, 0.0, 2, BinKind::Quantitative);
        assert_eq!(edges[2], QUANTITATIVE_EDGE_NUDGE);

        let edges = bin_edges(0.0, 10.0, 2, BinKind::Temporal);
        assert_eq!(edges[2], 11.0);
    }

    #[test]
    fn test_negative_max_stays_inside() {
        let values = vec![-50.0, -20.0, -10.0];
        let bins = compute_bins(&values, BinKind::Quantitative, &BinningConfig::explicit(3)).unwrap();
        assert_eq!(bins.digitize(-10.0), Some(2));
        assert_eq!(bins.digitize(-50.0), Some(0));
    }

    #[test]
    fn test_constant_series_collapses_to_one_bin() {
        let values = vec![4.0, 4.0, 4.0];
        let bins = compute_bins(&values, BinKind::Quantitative, &BinningConfig::default()).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins.digitize(4.0), Some(0));
    }

    #[test]
    fn test_freedman_diaconis() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 20.0];
        // IQR = 4, width = 8 / 9^(1/3) ≈ 3.85, range 20 => 6 bins
        assert_eq!(bin_count(&values, &BinningConfig::default()).unwrap(), 6);
    }

    #[test]
    fn test_procedures_are_clamped() {
        let values: Vec<f64> = (0..10_000).map(|v| v as f64).collect();
        let sqrt = BinningConfig::with_procedure(BinningProcedure::SquareRoot);
        assert_eq!(bin_count(&values, &sqrt).unwrap(), 25);

        // Explicit counts bypass the clamp
        assert_eq!(bin_count(&values, &BinningConfig::explicit(40)).unwrap(), 40);

        let sturges = BinningConfig::with_procedure(BinningProcedure::Sturges);
        assert_eq!(bin_count(&values, &sturges).unwrap(), 15);

        // Zero IQR with outliers gives an infinite count
        let mut spiky = vec![5.0; 100];
        spiky.push(1000.0);
        assert_eq!(bin_count(&spiky, &BinningConfig::default()).unwrap(), 25);
    }

    #[test]
    fn test_infer_precision() {
        assert_eq!(infer_precision(&[1.0, 2.0, 3.0], 100, 3), 0);
        assert_eq!(infer_precision(&[1.5, 2.25], 100, 3), 2);
        assert_eq!(infer_precision(&[0.123456], 100, 3), 3);

        let many: Vec<f64> = (0..500).map(|v| v as f64 + 0.5).collect();
        assert_eq!(infer_precision(&many, 100, 3), 1);
    }

    #[test]
    fn test_labels() {
        let bins = compute_bins(&[0.5, 1.5, 2.5], BinKind::Quantitative, &BinningConfig::explicit(2)).unwrap();
        assert_eq!(bins.precision(), 1);
        assert_eq!(bins.label(0), "[0.5, 1.5)");
        assert_eq!(bins.labels().len(), 2);
    }
}
