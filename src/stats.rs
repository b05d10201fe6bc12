//! Summary statistics over a [`ResultSet`].

use serde::{Deserialize, Serialize};

use crate::batch::ResultSet;

/// Two-sided 95% z-score for the normal approximation of the sample mean.
pub const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    /// `mean ± Z_95 * std_dev / sqrt(N)`.
    pub confidence_interval: (f64, f64),
    pub min: u32,
    pub max: u32,
}

impl SummaryStatistics {
    /// Standard error of the mean.
    #[inline]
    pub fn standard_error(&self) -> f64 { self.std_dev / (self.count as f64).sqrt() }

    /// Half-width of the 95% confidence interval.
    #[inline]
    pub fn margin(&self) -> f64 { Z_95 * self.standard_error() }
}

/// Compute mean, population standard deviation, 95% confidence interval and
/// extrema of `results`.
///
/// # Panics
///
/// Panics if `results` is empty. A successful `run_batch` never returns an
/// empty set.
///
/// ```
/// use knight_walk::batch::ResultSet;
/// use knight_walk::stats::analyze;
///
/// let s = analyze(&ResultSet::from_vec(vec![1, 2, 3, 4, 5]));
/// assert_eq!(s.mean, 3.0);
/// assert!((s.std_dev - 2f64.sqrt()).abs() < 1e-12);
/// assert_eq!((s.min, s.max), (1, 5));
/// ```
pub fn analyze(results: &ResultSet) -> SummaryStatistics {
    assert!(!results.is_empty(), "analyze requires a non-empty ResultSet");
    let values = results.as_slice();
    let n = values.len() as f64;

    let (sum, min, max) = values.iter().fold((0u64, u32::MAX, 0u32), |(sum, min, max), &v| {
        (sum + v as u64, min.min(v), max.max(v))
    });
    let mean = sum as f64 / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let margin = Z_95 * (std_dev / n.sqrt());

    SummaryStatistics {
        count: values.len(),
        mean,
        std_dev,
        confidence_interval: (mean - margin, mean + margin),
        min,
        max,
    }
}
