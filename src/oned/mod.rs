//! One-dimensional tabular distributions
//!
//! These are the per-bin building blocks of the two-dimensional engine: a
//! distribution over the secondary variable with explicit support bounds,
//! evaluable as a raw dependent value, a normalized density or a CDF, and
//! sampled exactly by CDF inversion.
//!
//! The family is closed: [`Continuous1D`] enumerates the concrete types and
//! dispatches [`OneDimensional`] statically. Generic conveniences that take
//! an rng live on [`Sample1D`], a blanket extension trait, mirroring the
//! `RngCore`/`Rng` split in `rand`.

use enum_dispatch::enum_dispatch;
use rand::Rng;

mod uniform;
pub use self::uniform::*;

mod tabular;
pub use self::tabular::*;

/// A tabular distribution of a single continuous variable.
///
/// Implementations guarantee a non-empty support `[lower_bound, upper_bound]`,
/// a non-negative density, and a CDF that is 0 at or below the lower bound,
/// 1 at or above the upper bound, and non-decreasing in between.
/// `sample_with_random_number` is the exact inverse of `evaluate_cdf`:
/// `evaluate_cdf(sample_with_random_number(u)) == u` up to round-off.
#[enum_dispatch]
pub trait OneDimensional {
    /// Raw dependent value at `y`; zero outside the support.
    fn evaluate(&self, y: f64) -> f64;

    /// Normalized probability density at `y`.
    fn evaluate_pdf(&self, y: f64) -> f64;

    /// Cumulative probability at `y`, clamped to `[0, 1]`.
    fn evaluate_cdf(&self, y: f64) -> f64;

    /// Inverse-CDF sample for the uniform deviate `u` in `[0, 1]`.
    fn sample_with_random_number(&self, u: f64) -> f64;

    /// As [`sample_with_random_number`](OneDimensional::sample_with_random_number),
    /// additionally reporting the index of the secondary grid bin the sample
    /// landed in.
    fn sample_bin_with_random_number(&self, u: f64) -> (f64, usize);

    /// Lower edge of the support.
    fn lower_bound(&self) -> f64;

    /// Upper edge of the support.
    fn upper_bound(&self) -> f64;
}

/// Rng-driven sampling conveniences, implemented for every
/// [`OneDimensional`] type.
pub trait Sample1D: OneDimensional {
    /// Draws one sample, consuming one value from `rng`.
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.sample_with_random_number(rng.gen())
    }

    /// Draws one sample and reports the secondary grid bin it landed in.
    fn sample_and_record_bin<R: Rng>(&self, rng: &mut R) -> (f64, usize) {
        self.sample_bin_with_random_number(rng.gen())
    }

    /// Inverse-CDF sample restricted to `y <= cap`, renormalizing the
    /// deviate against the truncated CDF. `cap` must lie above the lower
    /// support bound.
    fn sample_with_random_number_in_subrange(&self, u: f64, cap: f64) -> f64 {
        debug_assert!(cap > self.lower_bound());
        let ceiling = self.evaluate_cdf(cap.min(self.upper_bound()));
        self.sample_with_random_number(u * ceiling)
    }

    /// Draws one sample restricted to `y <= cap`.
    fn sample_in_subrange<R: Rng>(&self, rng: &mut R, cap: f64) -> f64 {
        self.sample_with_random_number_in_subrange(rng.gen(), cap)
    }
}

impl<T: OneDimensional> Sample1D for T {}

/// The closed family of one-dimensional distribution types.
#[enum_dispatch(OneDimensional)]
#[derive(Clone, Debug)]
pub enum Continuous1D {
    Uniform(UniformDistribution),
    Tabular(TabularDistribution),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedSequence;

    #[test]
    fn enum_dispatches_to_variants() {
        let u: Continuous1D = UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into();
        let t: Continuous1D =
            TabularDistribution::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5]).unwrap().into();

        assert_eq!(u.lower_bound(), 0.0);
        assert_eq!(u.upper_bound(), 10.0);
        assert_eq!(t.lower_bound(), 2.5);
        assert_eq!(t.upper_bound(), 7.5);
        assert_eq!(u.evaluate(5.0), 1.0);
        assert!((t.evaluate_cdf(5.0) - 1.375 / 3.25).abs() < 1.0e-15);
    }

    #[test]
    fn rng_sampling_consumes_one_value_per_draw() {
        let u: Continuous1D = UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into();
        let mut rng = FixedSequence::new(&[0.0, 0.5, 1.0 - 1.0e-15]);

        assert_eq!(u.sample(&mut rng), 0.0);
        assert_eq!(u.sample(&mut rng), 5.0);
        assert!((u.sample(&mut rng) - 10.0).abs() < 1.0e-14);
    }

    #[test]
    fn subrange_sampling_respects_the_cap() {
        let t: Continuous1D =
            TabularDistribution::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5]).unwrap().into();
        let mut rng = FixedSequence::new(&[0.0, 0.3, 0.7, 1.0 - 1.0e-15]);
        for _ in 0..4 {
            let y = t.sample_in_subrange(&mut rng, 5.0);
            assert!(y >= 2.5 && y <= 5.0 + 1.0e-12, "y = {}", y);
        }
    }
}
