//! Unit-based correlated sampling policy

use rand::Rng;

use crate::interp::{self, Tolerance, TwoDInterpolation};
use crate::oned::{Continuous1D, OneDimensional, Sample1D};
use super::{support_eta, BinPair, BinSide, Sampled, SamplingScheme};

/// Interpolates unit-base coordinates between the bounding distributions.
///
/// The same random number drives an inverse-CDF sample of *both* bounds; each
/// raw sample is normalized to its own support, the normalized positions are
/// interpolated at the primary fraction, and the result is mapped into the
/// interpolated support range. Every draw therefore contributes to the result
/// through interpolation rather than an either/or selection. A primary query
/// landing exactly on a grid point degenerates to that single entry with no
/// interpolation.
#[derive(Copy, Clone, Debug, Default)]
pub struct Correlated;

/// Deterministic unit-base sample at fraction `beta` between the bounds.
pub(super) fn unit_base_sample<I>(pair: &BinPair, x: f64, u: f64) -> f64
where
    I: TwoDInterpolation,
{
    let beta = pair.fraction::<I>(x);
    if beta >= 1.0 {
        return pair.upper.sample_with_random_number(u);
    }
    let (y_min, y_max) = pair.bounds::<I>(x);
    let s_lo = pair.lower.sample_with_random_number(u);
    let s_hi = pair.upper.sample_with_random_number(u);
    let eta = interp::lerp(
        beta,
        support_eta::<I::Secondary>(pair.lower, s_lo),
        support_eta::<I::Secondary>(pair.upper, s_hi),
    );
    interp::from_unit_base::<I::Secondary>(eta, y_min, y_max)
}

/// Deterministic unit-base sample restricted to `y <= cap`. The cap is
/// mapped into each bound's own support and each bound is truncated there,
/// so the blended result cannot exceed the cap.
pub(super) fn unit_base_sample_in_subrange<I>(
    pair: &BinPair,
    x: f64,
    u: f64,
    cap: f64,
    tol: &Tolerance,
) -> f64
where
    I: TwoDInterpolation,
{
    let beta = pair.fraction::<I>(x);
    if beta >= 1.0 {
        return pair.upper.sample_with_random_number_in_subrange(u, cap);
    }
    let (y_min, y_max) = pair.bounds::<I>(x);
    debug_assert!(cap > y_min);
    let eta_cap =
        interp::unit_base_eta::<I::Secondary>(cap.min(y_max), y_min, y_max, tol).unwrap_or(1.0);
    let cap_lo = interp::from_unit_base::<I::Secondary>(
        eta_cap,
        pair.lower.lower_bound(),
        pair.lower.upper_bound(),
    );
    let cap_hi = interp::from_unit_base::<I::Secondary>(
        eta_cap,
        pair.upper.lower_bound(),
        pair.upper.upper_bound(),
    );
    let s_lo = pair.lower.sample_with_random_number_in_subrange(u, cap_lo);
    let s_hi = pair.upper.sample_with_random_number_in_subrange(u, cap_hi);
    let eta = interp::lerp(
        beta,
        support_eta::<I::Secondary>(pair.lower, s_lo),
        support_eta::<I::Secondary>(pair.upper, s_hi),
    );
    interp::from_unit_base::<I::Secondary>(eta, y_min, y_max)
}

/// Correlated evaluation against explicit, pre-computed secondary-range
/// boundaries (the optimization path for callers that already hold the
/// interpolated support).
pub(super) fn evaluate_in_boundaries<I, F>(
    pair: &BinPair,
    x: f64,
    y: f64,
    y_min: f64,
    y_max: f64,
    tol: &Tolerance,
    f: F,
) -> f64
where
    I: TwoDInterpolation,
    F: Fn(&Continuous1D, f64) -> f64,
{
    let beta = pair.fraction::<I>(x);
    if beta >= 1.0 {
        return f(pair.upper, y);
    }
    let eta = match interp::unit_base_eta::<I::Secondary>(y, y_min, y_max, tol) {
        Some(eta) => eta,
        None => return 0.0,
    };
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
    interp::lerp(beta, f(pair.lower, y_lo), f(pair.upper, y_hi))
}

/// Correlated CDF against explicit secondary-range boundaries.
pub(super) fn cdf_in_boundaries<I>(
    pair: &BinPair,
    x: f64,
    y: f64,
    y_min: f64,
    y_max: f64,
    tol: &Tolerance,
) -> f64
where
    I: TwoDInterpolation,
{
    let beta = pair.fraction::<I>(x);
    if beta >= 1.0 {
        return pair.upper.evaluate_cdf(y);
    }
    match interp::unit_base_eta::<I::Secondary>(y, y_min, y_max, tol) {
        None => {
            if y < y_min {
                0.0
            } else {
                1.0
            }
        }
        Some(eta) => {
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
            let cdf = interp::lerp(beta, pair.lower.evaluate_cdf(y_lo), pair.upper.evaluate_cdf(y_hi));
            cdf.max(0.0).min(1.0)
        }
    }
}

impl SamplingScheme for Correlated {
    fn evaluate<I, F>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance, f: F) -> f64
    where
        I: TwoDInterpolation,
        F: Fn(&Continuous1D, f64) -> f64,
    {
        let (y_min, y_max) = pair.bounds::<I>(x);
        evaluate_in_boundaries::<I, F>(pair, x, y, y_min, y_max, tol, f)
    }

    fn evaluate_cdf<I>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation,
    {
        let (y_min, y_max) = pair.bounds::<I>(x);
        cdf_in_boundaries::<I>(pair, x, y, y_min, y_max, tol)
    }

    fn sample_detailed<I, R>(pair: &BinPair, x: f64, _tol: &Tolerance, rng: &mut R) -> Sampled
    where
        I: TwoDInterpolation,
        R: Rng,
    {
        let u = rng.gen::<f64>();
        let beta = pair.fraction::<I>(x);
        if beta >= 1.0 {
            let (raw, secondary_bin) = pair.upper.sample_bin_with_random_number(u);
            return Sampled { value: raw, raw, side: BinSide::Upper, secondary_bin };
        }
        let (y_min, y_max) = pair.bounds::<I>(x);
        let (s_lo, bin_lo) = pair.lower.sample_bin_with_random_number(u);
        let (s_hi, bin_hi) = pair.upper.sample_bin_with_random_number(u);
        let eta = interp::lerp(
            beta,
            support_eta::<I::Secondary>(pair.lower, s_lo),
            support_eta::<I::Secondary>(pair.upper, s_hi),
        );
        let value = interp::from_unit_base::<I::Secondary>(eta, y_min, y_max);

        // attribute the blended sample to the nearer bin boundary
        let (raw, side, secondary_bin) = if beta < 0.5 {
            (s_lo, BinSide::Lower, bin_lo)
        } else {
            (s_hi, BinSide::Upper, bin_hi)
        };
        Sampled { value, raw, side, secondary_bin }
    }

    fn sample_with_random_number<I>(pair: &BinPair, x: f64, u: f64, _tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation,
    {
        unit_base_sample::<I>(pair, x, u)
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
        unit_base_sample_in_subrange::<I>(pair, x, u, cap, tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::LinLinLin;
    use crate::oned::{TabularDistribution, UniformDistribution};
    use crate::random::FixedSequence;

    fn fixture() -> (Continuous1D, Continuous1D) {
        (
            UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into(),
            TabularDistribution::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5]).unwrap().into(),
        )
    }

    #[test]
    fn deterministic_samples_span_the_interpolated_support() {
        let (lower, upper) = fixture();
        let pair = BinPair { x_lo: 0.0, x_hi: 1.0, lower: &lower, upper: &upper };
        let tol = Tolerance::default();

        let y = Correlated::sample_with_random_number::<LinLinLin>(&pair, 0.5, 0.0, &tol);
        assert!((y - 1.25).abs() < 1.0e-14);
        let y = Correlated::sample_with_random_number::<LinLinLin>(&pair, 0.5, 1.0 - 1.0e-15, &tol);
        assert!((y - 8.75).abs() < 1.0e-12);
        // interior draws are monotone in the deviate
        let mut prev = 0.0;
        for i in 0..=20 {
            let u = (i as f64) / 20.0 * (1.0 - 1.0e-12);
            let y = Correlated::sample_with_random_number::<LinLinLin>(&pair, 0.5, u, &tol);
            assert!(y >= prev);
            prev = y;
        }
    }

    #[test]
    fn exact_grid_point_degenerates_to_a_single_entry() {
        let (lower, upper) = fixture();
        let pair = BinPair { x_lo: 0.0, x_hi: 1.0, lower: &lower, upper: &upper };
        let tol = Tolerance::default();

        // x on the upper boundary: the tabular distribution alone
        let y = Correlated::sample_with_random_number::<LinLinLin>(&pair, 1.0, 0.5, &tol);
        let expected = upper.sample_with_random_number(0.5);
        assert_eq!(y, expected);

        let mut rng = FixedSequence::new(&[0.5]);
        let s = Correlated::sample_detailed::<LinLinLin, _>(&pair, 1.0, &tol, &mut rng);
        assert_eq!(s.side, BinSide::Upper);
        assert_eq!(s.value, expected);
        assert_eq!(s.raw, expected);
    }

    #[test]
    fn shared_deviate_drives_both_bounds() {
        let (lower, upper) = fixture();
        let pair = BinPair { x_lo: 0.0, x_hi: 1.0, lower: &lower, upper: &upper };
        let tol = Tolerance::default();

        let u = 0.5;
        let s_lo = lower.sample_with_random_number(u);
        let s_hi = upper.sample_with_random_number(u);
        let eta = 0.5 * (s_lo / 10.0 + (s_hi - 2.5) / 5.0);
        let expected = 1.25 + eta * 7.5;

        let y = Correlated::sample_with_random_number::<LinLinLin>(&pair, 0.5, u, &tol);
        assert!((y - expected).abs() < 1.0e-12, "y = {}, expected = {}", y, expected);
    }

    #[test]
    fn subrange_samples_respect_the_cap() {
        let (lower, upper) = fixture();
        let pair = BinPair { x_lo: 0.0, x_hi: 1.0, lower: &lower, upper: &upper };
        let tol = Tolerance::default();

        for &u in &[0.0, 0.25, 0.5, 0.75, 1.0 - 1.0e-15] {
            let y = Correlated::sample_with_random_number_in_subrange::<LinLinLin>(
                &pair, 0.5, u, 5.0, &tol,
            );
            assert!(y >= 1.25 && y <= 5.0 + 1.0e-12, "u = {}, y = {}", u, y);
        }
        // a cap above the support ceiling reduces to the full-range sample
        let full = Correlated::sample_with_random_number::<LinLinLin>(&pair, 0.5, 0.3, &tol);
        let capped = Correlated::sample_with_random_number_in_subrange::<LinLinLin>(
            &pair, 0.5, 0.3, 20.0, &tol,
        );
        assert!((full - capped).abs() < 1.0e-12);
    }

    #[test]
    fn in_boundaries_evaluation_matches_the_computed_bounds() {
        let (lower, upper) = fixture();
        let pair = BinPair { x_lo: 0.0, x_hi: 1.0, lower: &lower, upper: &upper };
        let tol = Tolerance::default();

        let direct =
            Correlated::evaluate::<LinLinLin, _>(&pair, 0.5, 5.0, &tol, |d, y| d.evaluate_pdf(y));
        let explicit = evaluate_in_boundaries::<LinLinLin, _>(
            &pair, 0.5, 5.0, 1.25, 8.75, &tol, |d, y| d.evaluate_pdf(y),
        );
        assert_eq!(direct, explicit);

        let c = cdf_in_boundaries::<LinLinLin>(&pair, 0.5, 8.75, 1.25, 8.75, &tol);
        assert_eq!(c, 1.0);
        let c = cdf_in_boundaries::<LinLinLin>(&pair, 0.5, 1.25, 1.25, 8.75, &tol);
        assert_eq!(c, 0.0);
    }
}
