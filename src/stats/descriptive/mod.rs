// Descriptive statistics internals

use crate::error::{Error, Result};
use crate::stats::DescriptiveStats;

fn require_data(data: &[f64], what: &str) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptyData(format!("{} requires at least one value", what)));
    }
    Ok(())
}

pub(crate) fn mean_impl(data: &[f64]) -> Result<f64> {
    require_data(data, "mean")?;
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom
pub(crate) fn variance_impl(data: &[f64], ddof: usize) -> Result<f64> {
    require_data(data, "variance")?;
    if data.len() <= ddof {
        return Err(Error::InsufficientData(format!(
            "variance with ddof={} needs more than {} values",
            ddof, ddof
        )));
    }

    let mean = mean_impl(data)?;
    let sum_squared_diff = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>();
    Ok(sum_squared_diff / (data.len() - ddof) as f64)
}

/// Standard error of the mean (sample standard deviation over sqrt(n))
pub(crate) fn sem_impl(data: &[f64]) -> Result<f64> {
    let variance = variance_impl(data, 1)?;
    Ok(variance.sqrt() / (data.len() as f64).sqrt())
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolated percentile of already sorted data, `p` in [0, 1]
pub(crate) fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }

    let n = sorted_data.len();
    let idx = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let idx_floor = idx.floor() as usize;
    let idx_ceil = idx.ceil() as usize;

    if idx_floor == idx_ceil {
        return sorted_data[idx_floor];
    }

    let weight_ceil = idx - idx_floor as f64;
    let weight_floor = 1.0 - weight_ceil;

    sorted_data[idx_floor] * weight_floor + sorted_data[idx_ceil] * weight_ceil
}

pub(crate) fn describe_impl(data: &[f64]) -> Result<DescriptiveStats> {
    require_data(data, "describe")?;

    let count = data.len();
    let mean = mean_impl(data)?;
    let std = if count > 1 {
        variance_impl(data, 1)?.sqrt()
    } else {
        0.0
    };

    let sorted = sorted_copy(data);

    Ok(DescriptiveStats {
        count,
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Pearson correlation coefficient
pub(crate) fn correlation_impl(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }

    let n = x.len();
    if n <= 1 {
        return Err(Error::InsufficientData(
            "correlation requires at least two data points".into(),
        ));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    // Numerator: Σ(xi - x̄)(yi - ȳ)
    let numerator = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y))
        .sum::<f64>();

    // Denominator: √[Σ(xi - x̄)² * Σ(yi - ȳ)²]
    let sum_squared_diff_x = x.iter().map(|&xi| (xi - mean_x).powi(2)).sum::<f64>();
    let sum_squared_diff_y = y.iter().map(|&yi| (yi - mean_y).powi(2)).sum::<f64>();

    let denominator = (sum_squared_diff_x * sum_squared_diff_y).sqrt();

    if denominator.abs() < f64::EPSILON {
        return Err(Error::StatisticalComputation(
            "correlation: zero variance".into(),
        ));
    }

    Ok(numerator / denominator)
}

/// Shannon entropy (natural log) of a distribution given by non-negative weights
///
/// Weights are normalized to sum to one; zero weights contribute nothing.
pub(crate) fn entropy_impl(weights: &[f64]) -> Result<f64> {
    require_data(weights, "entropy")?;
    if weights.iter().any(|&w| w < 0.0 || !w.is_finite()) {
        return Err(Error::StatisticalComputation(
            "entropy: weights must be finite and non-negative".into(),
        ));
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::StatisticalComputation("entropy: weights sum to zero".into()));
    }

    Ok(weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum())
}

/// Gini coefficient of non-negative values
pub(crate) fn gini_impl(values: &[f64]) -> Result<f64> {
    require_data(values, "gini")?;
    if values.iter().any(|&v| v < 0.0 || !v.is_finite()) {
        return Err(Error::StatisticalComputation(
            "gini: values must be finite and non-negative".into(),
        ));
    }

    let sorted = sorted_copy(values);
    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return Err(Error::StatisticalComputation("gini: values sum to zero".into()));
    }

    // G = Σ (2i - n - 1) x_i / (n Σ x), i 1-based over ascending values
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (2.0 * (i as f64 + 1.0) - n - 1.0) * x)
        .sum();

    Ok(weighted / (n * total))
}
