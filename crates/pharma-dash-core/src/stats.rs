//! Descriptive statistics used by the section pipelines.

use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use thiserror::Error;

/// Input that a statistic is undefined for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateInput {
    #[error("no values for {0}")]
    EmptyInput(&'static str),

    #[error("{what} needs at least {needed} distinct values, found {found}")]
    TooFewDistinct {
        what: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("invalid kernel bandwidth: {0}")]
    Bandwidth(f64),
}

pub type StatsResult<T> = Result<T, DegenerateInput>;

/// Arithmetic mean.
pub fn mean(what: &'static str, values: impl IntoIterator<Item = f64>) -> StatsResult<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return Err(DegenerateInput::EmptyInput(what));
    }
    Ok(sum / n as f64)
}

/// Mean over the present values only; missing values are skipped.
pub fn mean_present(
    what: &'static str,
    values: impl IntoIterator<Item = Option<f64>>,
) -> StatsResult<f64> {
    mean(what, values.into_iter().flatten())
}

/// Round half to even at the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut xs: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            xs[count - 1] = end;
            xs
        }
    }
}

/// Five-number summary backing a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    /// Summarize values; quartiles use linear interpolation between ranks.
    pub fn from_values(
        what: &'static str,
        values: impl IntoIterator<Item = f64>,
    ) -> StatsResult<Self> {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        if sorted.is_empty() {
            return Err(DegenerateInput::EmptyInput(what));
        }
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// A sampled probability density curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub x: Vec<f64>,
    pub density: Vec<f64>,
}

/// Gaussian kernel density estimate sampled at `points` evenly spaced
/// positions spanning the observed range.
///
/// Bandwidth follows Scott's rule: sample standard deviation × n^(-1/5).
pub fn gaussian_kde(
    what: &'static str,
    samples: &[f64],
    points: usize,
) -> StatsResult<DensityCurve> {
    let mut distinct = samples.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(DegenerateInput::TooFewDistinct {
            what,
            needed: 2,
            found: distinct.len(),
        });
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = variance.sqrt() * n.powf(-0.2);
    let kernel = Normal::new(0.0, bandwidth).map_err(|_| DegenerateInput::Bandwidth(bandwidth))?;

    let x = linspace(distinct[0], distinct[distinct.len() - 1], points);
    let density = x
        .iter()
        .map(|&at| samples.iter().map(|&s| kernel.pdf(at - s)).sum::<f64>() / n)
        .collect();

    Ok(DensityCurve {
        bandwidth,
        x,
        density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean("v", [1.0, 2.0, 6.0]), Ok(3.0));
        assert_eq!(mean("v", []), Err(DegenerateInput::EmptyInput("v")));
    }

    #[test]
    fn test_mean_present_skips_missing() {
        assert_eq!(mean_present("v", [Some(4.0), None, Some(2.0)]), Ok(3.0));
        assert!(mean_present("v", [None, None]).is_err());
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-0.4, 0), -0.0);
        assert_eq!(round_to(12.3456, 2), 12.35);
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.0, 10.0, 5);
        assert_eq!(xs, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(3.0, 9.0, 0).is_empty());
    }

    #[test]
    fn test_box_summary_interpolates_quartiles() {
        let summary = BoxSummary::from_values("v", [4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q3, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_box_summary_empty() {
        assert!(BoxSummary::from_values("v", []).is_err());
    }

    #[test]
    fn test_kde_requires_two_distinct_values() {
        let err = gaussian_kde("days", &[5.0, 5.0, 5.0], 10).unwrap_err();
        assert_eq!(
            err,
            DegenerateInput::TooFewDistinct {
                what: "days",
                needed: 2,
                found: 1
            }
        );
        assert!(gaussian_kde("days", &[], 10).is_err());
    }

    #[test]
    fn test_kde_spans_observed_range() {
        let samples = [0.0, 10.0, 20.0, 30.0, 40.0];
        let curve = gaussian_kde("days", &samples, 101).unwrap();

        assert_eq!(curve.x.len(), 101);
        assert_eq!(curve.density.len(), 101);
        assert_eq!(curve.x[0], 0.0);
        assert_eq!(curve.x[100], 40.0);
        assert!(curve.density.iter().all(|d| *d > 0.0));

        // Symmetric samples give a symmetric curve peaking in the middle.
        assert!((curve.density[0] - curve.density[100]).abs() < 1e-12);
        assert!(curve.density[50] > curve.density[0]);
    }

    #[test]
    fn test_kde_scott_bandwidth() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let curve = gaussian_kde("v", &samples, 2).unwrap();
        let sd = (5.0f64 / 3.0).sqrt();
        let expected = sd * 4f64.powf(-0.2);
        assert!((curve.bandwidth - expected).abs() < 1e-12);
    }
}
