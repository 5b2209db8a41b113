// Statistics module
//
// Descriptive statistics shared by the aggregation registry, the binner and
// the scorer. Hypothesis tests and regression live outside this crate.

pub mod descriptive;

use crate::error::Result;

/// Compute basic descriptive statistics
///
/// # Example
/// ```rust
/// use vizspec::stats;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let stats = stats::describe(&data).unwrap();
/// assert_eq!(stats.median, 3.0);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> Result<DescriptiveStats> {
    descriptive::describe_impl(data.as_ref())
}

/// Result of [`describe`]
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// Number of values
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1)
    pub std: f64,
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

pub fn mean<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    descriptive::mean_impl(data.as_ref())
}

/// Variance with `ddof` delta degrees of freedom (0 = population)
pub fn variance<T: AsRef<[f64]>>(data: T, ddof: usize) -> Result<f64> {
    descriptive::variance_impl(data.as_ref(), ddof)
}

/// Standard error of the mean
pub fn sem<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    descriptive::sem_impl(data.as_ref())
}

/// Linear-interpolated percentile, `p` in [0, 1]
pub fn percentile<T: AsRef<[f64]>>(data: T, p: f64) -> f64 {
    descriptive::percentile(&descriptive::sorted_copy(data.as_ref()), p)
}

/// Pearson correlation coefficient
///
/// # Example
/// ```rust
/// use vizspec::stats;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
/// let corr = stats::correlation(&x, &y).unwrap();
/// assert!((corr - 1.0).abs() < 1e-10);
/// ```
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    descriptive::correlation_impl(x.as_ref(), y.as_ref())
}

/// Shannon entropy in nats of the distribution proportional to `weights`
pub fn entropy<T: AsRef<[f64]>>(weights: T) -> Result<f64> {
    descriptive::entropy_impl(weights.as_ref())
}

/// Gini coefficient of non-negative values
pub fn gini<T: AsRef<[f64]>>(values: T) -> Result<f64> {
    descriptive::gini_impl(values.as_ref())
}
