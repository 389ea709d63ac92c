//! Piecewise-linear tabular distribution

use crate::error::GridError;
use super::OneDimensional;

/// A distribution tabulated as `(y, value)` points with linear interpolation
/// between them.
///
/// The tabulated values are raw (unnormalized) dependent values; the CDF is
/// their running trapezoidal integral divided by the total. Sampling inverts
/// the CDF exactly, segment by segment, so `evaluate_cdf` round-trips with
/// `sample_with_random_number` to round-off.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularDistribution {
    y: Vec<f64>,
    value: Vec<f64>,
    // running raw integral, cdf[i] = integral up to y[i]
    cdf: Vec<f64>,
    norm: f64,
}

impl TabularDistribution {
    /// Builds a tabular distribution from a strictly increasing secondary
    /// grid and the matching non-negative raw values.
    pub fn new(y: Vec<f64>, value: Vec<f64>) -> Result<TabularDistribution, GridError> {
        if y.len() != value.len() {
            return Err(GridError::length_mismatch("secondary grid and values"));
        }
        if y.len() < 2 {
            return Err(GridError::too_few_entries("secondary grid"));
        }
        if y.windows(2).any(|w| !(w[1] > w[0])) || y.iter().any(|v| !v.is_finite()) {
            return Err(GridError::unordered("secondary grid"));
        }
        if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(GridError::negative_value("tabulated values"));
        }

        let mut cdf = Vec::with_capacity(y.len());
        cdf.push(0.0);
        for i in 1..y.len() {
            let area = 0.5 * (value[i] + value[i - 1]) * (y[i] - y[i - 1]);
            cdf.push(cdf[i - 1] + area);
        }
        let norm = *cdf.last().unwrap();
        if norm <= 0.0 {
            return Err(GridError::zero_integral("tabulated values"));
        }

        Ok(TabularDistribution { y, value, cdf, norm })
    }

    /// Index of the segment containing `y`, for `y` inside the support.
    fn segment(&self, y: f64) -> usize {
        let i = self.y.partition_point(|&v| v <= y);
        i.saturating_sub(1).min(self.y.len() - 2)
    }
}

impl OneDimensional for TabularDistribution {
    fn evaluate(&self, y: f64) -> f64 {
        if y < self.y[0] || y > *self.y.last().unwrap() {
            return 0.0;
        }
        let i = self.segment(y);
        let slope = (self.value[i + 1] - self.value[i]) / (self.y[i + 1] - self.y[i]);
        self.value[i] + slope * (y - self.y[i])
    }

    fn evaluate_pdf(&self, y: f64) -> f64 {
        self.evaluate(y) / self.norm
    }

    fn evaluate_cdf(&self, y: f64) -> f64 {
        if y <= self.y[0] {
            return 0.0;
        }
        if y >= *self.y.last().unwrap() {
            return 1.0;
        }
        let i = self.segment(y);
        let t = y - self.y[i];
        let slope = (self.value[i + 1] - self.value[i]) / (self.y[i + 1] - self.y[i]);
        let raw = self.cdf[i] + self.value[i] * t + 0.5 * slope * t * t;
        (raw / self.norm).min(1.0)
    }

    fn sample_with_random_number(&self, u: f64) -> f64 {
        self.sample_bin_with_random_number(u).0
    }

    fn sample_bin_with_random_number(&self, u: f64) -> (f64, usize) {
        let target = u * self.norm;
        let i = self
            .cdf
            .partition_point(|&c| c <= target)
            .saturating_sub(1)
            .min(self.y.len() - 2);

        let d = target - self.cdf[i];
        let width = self.y[i + 1] - self.y[i];
        let a = self.value[i];
        let slope = (self.value[i + 1] - a) / width;

        let t = if slope == 0.0 {
            if a > 0.0 { d / a } else { 0.0 }
        } else {
            // invert a t + slope t^2 / 2 = d on this segment
            let disc = (a * a + 2.0 * slope * d).max(0.0);
            (disc.sqrt() - a) / slope
        };

        (self.y[i] + t.min(width), i)
    }

    fn lower_bound(&self) -> f64 {
        self.y[0]
    }

    fn upper_bound(&self) -> f64 {
        *self.y.last().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> TabularDistribution {
        TabularDistribution::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5]).unwrap()
    }

    #[test]
    fn construction_rejects_malformed_tables() {
        assert!(TabularDistribution::new(vec![1.0], vec![1.0]).is_err());
        assert!(TabularDistribution::new(vec![1.0, 1.0], vec![1.0, 1.0]).is_err());
        assert!(TabularDistribution::new(vec![2.0, 1.0], vec![1.0, 1.0]).is_err());
        assert!(TabularDistribution::new(vec![1.0, 2.0], vec![1.0, -1.0]).is_err());
        assert!(TabularDistribution::new(vec![1.0, 2.0], vec![0.0, 0.0]).is_err());
        assert!(TabularDistribution::new(vec![1.0, 2.0, 3.0], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn evaluation_interpolates_linearly() {
        let d = reference();
        assert_eq!(d.evaluate(2.5), 0.1);
        assert!((d.evaluate(3.75) - 0.55).abs() < 1.0e-15);
        assert_eq!(d.evaluate(5.0), 1.0);
        assert_eq!(d.evaluate(7.5), 0.5);
        assert_eq!(d.evaluate(2.0), 0.0);
        assert_eq!(d.evaluate(8.0), 0.0);
    }

    #[test]
    fn cdf_matches_the_trapezoidal_integral() {
        let d = reference();
        assert_eq!(d.evaluate_cdf(2.5), 0.0);
        assert!((d.evaluate_cdf(5.0) - 1.375 / 3.25).abs() < 1.0e-15);
        assert_eq!(d.evaluate_cdf(7.5), 1.0);
        // non-decreasing across the support
        let mut prev = 0.0;
        for i in 0..=100 {
            let y = 2.5 + 5.0 * (i as f64) / 100.0;
            let c = d.evaluate_cdf(y);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn sampling_round_trips_through_the_cdf() {
        let d = reference();
        assert_eq!(d.sample_with_random_number(0.0), 2.5);
        assert_eq!(d.sample_with_random_number(1.0), 7.5);
        for i in 0..=40 {
            let u = (i as f64) / 40.0;
            let y = d.sample_with_random_number(u);
            assert!((d.evaluate_cdf(y) - u).abs() < 1.0e-12, "u = {}", u);
        }
    }

    #[test]
    fn recorded_bin_brackets_the_sample() {
        let d = reference();
        for &u in &[0.01, 0.2, 1.375 / 3.25, 0.6, 0.99] {
            let (y, bin) = d.sample_bin_with_random_number(u);
            assert!(d.y[bin] <= y && y <= d.y[bin + 1], "u = {}, y = {}, bin = {}", u, y, bin);
        }
    }

    #[test]
    fn flat_segments_invert_without_a_quadratic() {
        let d = TabularDistribution::new(vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 1.0]).unwrap();
        assert!((d.sample_with_random_number(0.25) - 0.5).abs() < 1.0e-15);
        assert!((d.sample_with_random_number(0.75) - 1.5).abs() < 1.0e-15);
    }
}
