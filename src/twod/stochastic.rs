//! Unit-based stochastic sampling policy

use rand::Rng;

use crate::interp::{self, Tolerance, TwoDInterpolation};
use crate::oned::{Continuous1D, OneDimensional, Sample1D};
use super::{correlated, support_eta, BinPair, BinSide, Sampled, SamplingScheme};

/// Interpolates bin-local, unit-normalized quantities between the two
/// bounding distributions.
///
/// Evaluation maps the query point into each bound's own support through the
/// unit-base coordinate and combines the two values scaled by their grid
/// lengths, so densities transform consistently with the support widths.
/// Sampling draws one auxiliary random number to select a bound (with
/// probability given by the interpolation fraction), samples that bound's own
/// distribution, and remaps the result into the interpolated support.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stochastic;

impl SamplingScheme for Stochastic {
    fn evaluate<I, F>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance, f: F) -> f64
    where
        I: TwoDInterpolation,
        F: Fn(&Continuous1D, f64) -> f64,
    {
        let beta = pair.fraction::<I>(x);
        if beta >= 1.0 {
            return f(pair.upper, y);
        }
        let (y_min, y_max) = pair.bounds::<I>(x);
        let eta = match interp::unit_base_eta::<I::Secondary>(y, y_min, y_max, tol) {
            Some(eta) => eta,
            None => return 0.0,
        };
        let (l_lo, l_hi) = pair.lengths::<I>();
        let l_x = interp::grid_length::<I::Secondary>(y_min, y_max);
        let y_lo = interp::from_unit_base::<I::Secondary>(
            eta,
            pair.lower.lower_bound(),
            pair.lower.upper_bound(),
        );
        let y_hi = interp::from_unit_base::<I::Secondary>(
            eta,
            pair.upper.lower_bound(),
            pair.upper.upper_bound(),
        );
        ((1.0 - beta) * l_lo * f(pair.lower, y_lo) + beta * l_hi * f(pair.upper, y_hi)) / l_x
    }

    fn evaluate_cdf<I>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation,
    {
        let beta = pair.fraction::<I>(x);
        if beta >= 1.0 {
            return pair.upper.evaluate_cdf(y);
        }
        let (y_min, y_max) = pair.bounds::<I>(x);
        match interp::unit_base_eta::<I::Secondary>(y, y_min, y_max, tol) {
            None => {
                if y < y_min {
                    0.0
                } else {
                    1.0
                }
            }
            Some(eta) => {
                let (l_lo, l_hi) = pair.lengths::<I>();
                let l_x = interp::grid_length::<I::Secondary>(y_min, y_max);
                let y_lo = interp::from_unit_base::<I::Secondary>(
                    eta,
                    pair.lower.lower_bound(),
                    pair.lower.upper_bound(),
                );
                let y_hi = interp::from_unit_base::<I::Secondary>(
                    eta,
                    pair.upper.lower_bound(),
                    pair.upper.upper_bound(),
                );
                let cdf = ((1.0 - beta) * l_lo * pair.lower.evaluate_cdf(y_lo)
                    + beta * l_hi * pair.upper.evaluate_cdf(y_hi))
                    / l_x;
                cdf.max(0.0).min(1.0)
            }
        }
    }

    fn sample_detailed<I, R>(pair: &BinPair, x: f64, _tol: &Tolerance, rng: &mut R) -> Sampled
    where
        I: TwoDInterpolation,
        R: Rng,
    {
        let beta = pair.fraction::<I>(x);
        let (y_min, y_max) = pair.bounds::<I>(x);

        // auxiliary draw: pick a bound in proportion to the fraction
        let (dist, side) = if rng.gen::<f64>() < beta {
            (pair.upper, BinSide::Upper)
        } else {
            (pair.lower, BinSide::Lower)
        };

        let (raw, secondary_bin) = dist.sample_and_record_bin(rng);
        let eta = support_eta::<I::Secondary>(dist, raw);
        let value = interp::from_unit_base::<I::Secondary>(eta, y_min, y_max);

        Sampled { value, raw, side, secondary_bin }
    }

    fn sample_with_random_number<I>(pair: &BinPair, x: f64, u: f64, _tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation,
    {
        // No rng is available for the selection draw here, so the
        // deterministic variant shares the correlated unit-base mapping.
        correlated::unit_base_sample::<I>(pair, x, u)
    }

    fn sample_with_random_number_in_subrange<I>(
        pair: &BinPair,
        x: f64,
        u: f64,
        cap: f64,
        tol: &Tolerance,
    ) -> f64
    where
        I: TwoDInterpolation,
    {
        correlated::unit_base_sample_in_subrange::<I>(pair, x, u, cap, tol)
    }
}
