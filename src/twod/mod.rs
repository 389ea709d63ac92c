//! Interpolated tabular two-dimensional distributions
//!
//! A distribution over a secondary variable conditioned on a primary
//! variable, stored as an ordered grid of one-dimensional distributions and
//! interpolated between grid points by one of three interchangeable sampling
//! policies:
//!
//! * [`Stochastic`] — unit-based, selects one bounding distribution per draw;
//! * [`Correlated`] — unit-based, blends both bounds at the same deviate;
//! * [`Exact`] — interpolates the raw CDF surface and inverts it by root
//!   finding, the reference the other two are validated against.
//!
//! The policy and the interpolation scheme are both type parameters, so
//! dispatch monomorphizes away. The grid itself is immutable after
//! construction; the only mutable state is the primary-range extension flag.

use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;

use crate::error::{DomainError, GridError};
use crate::interp::{self, AxisScale, Tolerance, TwoDInterpolation};
use crate::oned::{Continuous1D, OneDimensional, Sample1D, TabularDistribution};

mod grid;
pub use self::grid::*;

mod stochastic;
pub use self::stochastic::*;

mod correlated;
pub use self::correlated::*;

mod exact;
pub use self::exact::*;

mod unit_aware;
pub use self::unit_aware::*;

/// Which of a bin's two bounding distributions a sample is attributed to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BinSide {
    Lower,
    Upper,
}

/// Detailed result of a policy-level sample: the remapped value, the raw
/// (pre-remapping) sample, the attributed bin side and the secondary-grid
/// bin used inside the attributed distribution.
#[derive(Copy, Clone, Debug)]
pub struct Sampled {
    pub value: f64,
    pub raw: f64,
    pub side: BinSide,
    pub secondary_bin: usize,
}

/// A primary-axis bin: the two bounding grid coordinates and their
/// distributions.
#[derive(Copy, Clone)]
pub struct BinPair<'a> {
    pub x_lo: f64,
    pub x_hi: f64,
    pub lower: &'a Continuous1D,
    pub upper: &'a Continuous1D,
}

impl<'a> BinPair<'a> {
    /// Interpolation fraction of `x` between the bin boundaries on the
    /// primary axis; 1 for a zero-width bin.
    pub fn fraction<I: TwoDInterpolation>(&self, x: f64) -> f64 {
        interp::fraction::<I::Primary>(self.x_lo, self.x_hi, x)
    }

    /// Support bounds of the conditional distribution at `x`, interpolated
    /// between the bounds of the two bounding distributions.
    pub fn bounds<I: TwoDInterpolation>(&self, x: f64) -> (f64, f64) {
        let beta = self.fraction::<I>(x);
        (
            interp::interpolate::<I::Secondary>(
                beta,
                self.lower.lower_bound(),
                self.upper.lower_bound(),
            ),
            interp::interpolate::<I::Secondary>(
                beta,
                self.lower.upper_bound(),
                self.upper.upper_bound(),
            ),
        )
    }

    /// Processed-space support lengths of the two bounding distributions.
    pub fn lengths<I: TwoDInterpolation>(&self) -> (f64, f64) {
        (
            interp::grid_length::<I::Secondary>(
                self.lower.lower_bound(),
                self.lower.upper_bound(),
            ),
            interp::grid_length::<I::Secondary>(
                self.upper.lower_bound(),
                self.upper.upper_bound(),
            ),
        )
    }
}

/// Normalized position of `y` within the support of `dist` on the secondary
/// axis. `y` is expected to lie inside the support.
pub(crate) fn support_eta<S: AxisScale>(dist: &Continuous1D, y: f64) -> f64 {
    let lo = S::process(dist.lower_bound());
    let hi = S::process(dist.upper_bound());
    if hi == lo {
        0.0
    } else {
        (S::process(y) - lo) / (hi - lo)
    }
}

/// A sampling policy: stateless, pure functions combining the two bounding
/// distributions of a bin. All methods are generic over the interpolation
/// scheme, so a policy/scheme pair monomorphizes to straight-line code.
pub trait SamplingScheme {
    /// Combines the per-bound values of `f` (raw value or density) at the
    /// query point; zero outside the policy's notion of the conditional
    /// support.
    fn evaluate<I, F>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance, f: F) -> f64
    where
        I: TwoDInterpolation,
        F: Fn(&Continuous1D, f64) -> f64;

    /// Conditional CDF at the query point: 0 below the conditional support,
    /// 1 above it, non-decreasing in between.
    fn evaluate_cdf<I>(pair: &BinPair, x: f64, y: f64, tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation;

    /// Draws one sample, reporting attribution detail.
    fn sample_detailed<I, R>(pair: &BinPair, x: f64, tol: &Tolerance, rng: &mut R) -> Sampled
    where
        I: TwoDInterpolation,
        R: Rng;

    /// Deterministic sample for the deviate `u` in `[0, 1)`.
    fn sample_with_random_number<I>(pair: &BinPair, x: f64, u: f64, tol: &Tolerance) -> f64
    where
        I: TwoDInterpolation;

    /// Deterministic sample restricted to `y <= cap`.
    fn sample_with_random_number_in_subrange<I>(
        pair: &BinPair,
        x: f64,
        u: f64,
        cap: f64,
        tol: &Tolerance,
    ) -> f64
    where
        I: TwoDInterpolation;
}

/// Result of a bin-recording sample on the full distribution.
#[derive(Copy, Clone, Debug)]
pub struct BinSample {
    /// The remapped sample value.
    pub value: f64,
    /// The raw sample drawn from the attributed distribution, before any
    /// unit-base remapping.
    pub raw: f64,
    /// Grid index of the attributed primary entry.
    pub primary_bin: usize,
    /// Secondary-grid bin used inside the attributed distribution.
    pub secondary_bin: usize,
}

enum Target {
    Entry(usize),
    Bin(usize),
}

/// An interpolated, fully tabular distribution of a secondary variable
/// conditioned on a primary variable.
///
/// `I` selects the interpolation scheme and `P` the sampling policy; both
/// are zero-sized. Out-of-range primary queries are governed by the
/// extension flag: while limited (the initial state), evaluation returns the
/// identity element and sampling fails with [`DomainError`]; while extended,
/// queries clamp to the nearest boundary entry's own distribution.
#[derive(Clone, Debug)]
pub struct InterpolatedTabular2D<I, P> {
    grid: PrimaryGrid,
    extended: bool,
    tol: Tolerance,
    scheme: PhantomData<(I, P)>,
}

/// Unit-based stochastic instantiation.
pub type StochasticTabular2D<I> = InterpolatedTabular2D<I, Stochastic>;

/// Unit-based correlated instantiation.
pub type CorrelatedTabular2D<I> = InterpolatedTabular2D<I, Correlated>;

/// Correlated-exact instantiation.
pub type ExactTabular2D<I> = InterpolatedTabular2D<I, Exact>;

impl<I, P> InterpolatedTabular2D<I, P>
where
    I: TwoDInterpolation,
    P: SamplingScheme,
{
    /// Builds the distribution from `(primary value, distribution)` pairs
    /// with the default tolerances. Entries may share distributions.
    pub fn new(entries: Vec<GridEntry>) -> Result<Self, GridError> {
        Self::with_tolerances(entries, Tolerance::default())
    }

    /// As [`new`](Self::new), with explicit fuzzy-boundary and relative
    /// tolerances.
    pub fn with_tolerances(entries: Vec<GridEntry>, tol: Tolerance) -> Result<Self, GridError> {
        let grid = PrimaryGrid::new(entries)?;
        for i in 0..grid.len() {
            if !I::Primary::valid(grid.primary(i)) {
                return Err(GridError::not_representable("primary grid value"));
            }
            let d = grid.distribution(i);
            if !I::Secondary::valid(d.lower_bound()) || !I::Secondary::valid(d.upper_bound()) {
                return Err(GridError::not_representable("secondary support bound"));
            }
        }
        log::debug!(
            "tabulated 2D distribution over [{:e}, {:e}] with {} grid points",
            grid.min(),
            grid.max(),
            grid.len()
        );
        Ok(Self { grid, extended: false, tol, scheme: PhantomData })
    }

    /// Builds the distribution from parallel arrays: one secondary grid and
    /// one table of raw values per primary point. The per-point tabular
    /// distributions are constructed internally.
    pub fn from_grids(
        primary: Vec<f64>,
        secondary: Vec<Vec<f64>>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, GridError> {
        if primary.len() != secondary.len() || primary.len() != values.len() {
            return Err(GridError::length_mismatch(
                "primary grid, secondary grids and value tables",
            ));
        }
        let entries = primary
            .into_iter()
            .zip(secondary.into_iter().zip(values))
            .map(|(x, (grid, vals))| {
                let dist = TabularDistribution::new(grid, vals)?;
                Ok((x, Arc::new(Continuous1D::from(dist))))
            })
            .collect::<Result<Vec<_>, GridError>>()?;
        Self::new(entries)
    }

    /// Allows primary queries outside the grid range to clamp to the
    /// nearest boundary entry. Idempotent.
    pub fn extend_beyond_primary_limits(&mut self) {
        self.extended = true;
    }

    /// Restores the initial behavior: out-of-range evaluation yields the
    /// identity element and out-of-range sampling fails. Idempotent.
    pub fn limit_to_primary_limits(&mut self) {
        self.extended = false;
    }

    /// Is extension beyond the primary grid currently enabled?
    pub fn extends_beyond_primary_limits(&self) -> bool {
        self.extended
    }

    /// Lowest tabulated primary value.
    pub fn primary_lower_bound(&self) -> f64 {
        self.grid.min()
    }

    /// Highest tabulated primary value.
    pub fn primary_upper_bound(&self) -> f64 {
        self.grid.max()
    }

    /// Do the two distributions cover the same primary range? Compares the
    /// grid extremes only, not the full grids.
    pub fn has_same_primary_bounds(&self, other: &Self) -> bool {
        self.grid.min() == other.grid.min() && self.grid.max() == other.grid.max()
    }

    fn pair(&self, upper: usize) -> BinPair {
        BinPair {
            x_lo: self.grid.primary(upper - 1),
            x_hi: self.grid.primary(upper),
            lower: self.grid.distribution(upper - 1),
            upper: self.grid.distribution(upper),
        }
    }

    fn domain_error(&self, x: f64) -> DomainError {
        log::warn!(
            "sample requested at primary value {:e}, outside [{:e}, {:e}]",
            x,
            self.grid.min(),
            self.grid.max()
        );
        DomainError::new(x, self.grid.min(), self.grid.max())
    }

    fn resolve_for_sampling(&self, x: f64) -> Result<Target, DomainError> {
        match self.grid.lookup(x) {
            Lookup::Lowest => Ok(Target::Entry(0)),
            Lookup::Below => {
                if self.extended {
                    log::trace!("clamping primary value {:e} to the lowest grid entry", x);
                    Ok(Target::Entry(0))
                } else {
                    Err(self.domain_error(x))
                }
            }
            Lookup::Above => {
                if self.extended {
                    log::trace!("clamping primary value {:e} to the highest grid entry", x);
                    Ok(Target::Entry(self.grid.len() - 1))
                } else {
                    Err(self.domain_error(x))
                }
            }
            Lookup::Pair { upper } => Ok(Target::Bin(upper)),
        }
    }

    fn density_impl<Q, F>(&self, x: f64, y: f64, f: F) -> f64
    where
        Q: SamplingScheme,
        F: Fn(&Continuous1D, f64) -> f64,
    {
        match self.grid.lookup(x) {
            Lookup::Lowest => f(self.grid.first(), y),
            Lookup::Below => {
                if self.extended {
                    f(self.grid.first(), y)
                } else {
                    0.0
                }
            }
            Lookup::Above => {
                if self.extended {
                    f(self.grid.last(), y)
                } else {
                    0.0
                }
            }
            Lookup::Pair { upper } => Q::evaluate::<I, F>(&self.pair(upper), x, y, &self.tol, f),
        }
    }

    fn cdf_impl<Q: SamplingScheme>(&self, x: f64, y: f64) -> f64 {
        match self.grid.lookup(x) {
            Lookup::Lowest => self.grid.first().evaluate_cdf(y),
            Lookup::Below => {
                if self.extended {
                    self.grid.first().evaluate_cdf(y)
                } else {
                    0.0
                }
            }
            Lookup::Above => {
                if self.extended {
                    self.grid.last().evaluate_cdf(y)
                } else {
                    1.0
                }
            }
            Lookup::Pair { upper } => Q::evaluate_cdf::<I>(&self.pair(upper), x, y, &self.tol),
        }
    }

    fn deterministic_impl<Q: SamplingScheme>(&self, x: f64, u: f64) -> Result<f64, DomainError> {
        match self.resolve_for_sampling(x)? {
            Target::Entry(i) => Ok(self.grid.distribution(i).sample_with_random_number(u)),
            Target::Bin(upper) => {
                Ok(Q::sample_with_random_number::<I>(&self.pair(upper), x, u, &self.tol))
            }
        }
    }

    fn subrange_impl<Q: SamplingScheme>(
        &self,
        x: f64,
        u: f64,
        cap: f64,
    ) -> Result<f64, DomainError> {
        match self.resolve_for_sampling(x)? {
            Target::Entry(i) => {
                Ok(self.grid.distribution(i).sample_with_random_number_in_subrange(u, cap))
            }
            Target::Bin(upper) => Ok(Q::sample_with_random_number_in_subrange::<I>(
                &self.pair(upper),
                x,
                u,
                cap,
                &self.tol,
            )),
        }
    }

    fn sample_impl<Q, R>(&self, x: f64, rng: &mut R) -> Result<(usize, Sampled), DomainError>
    where
        Q: SamplingScheme,
        R: Rng,
    {
        match self.resolve_for_sampling(x)? {
            Target::Entry(i) => {
                let (raw, secondary_bin) = self.grid.distribution(i).sample_and_record_bin(rng);
                Ok((i, Sampled { value: raw, raw, side: BinSide::Lower, secondary_bin }))
            }
            Target::Bin(upper) => {
                let sampled = Q::sample_detailed::<I, R>(&self.pair(upper), x, &self.tol, rng);
                let index = match sampled.side {
                    BinSide::Lower => upper - 1,
                    BinSide::Upper => upper,
                };
                Ok((index, sampled))
            }
        }
    }

    /// Raw tabulated value at `(x, y)`, combined by the chosen policy.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.density_impl::<P, _>(x, y, |d, y| d.evaluate(y))
    }

    /// Conditional probability density at `(x, y)`.
    pub fn evaluate_pdf(&self, x: f64, y: f64) -> f64 {
        self.density_impl::<P, _>(x, y, |d, y| d.evaluate_pdf(y))
    }

    /// Conditional cumulative probability at `(x, y)`.
    pub fn evaluate_cdf(&self, x: f64, y: f64) -> f64 {
        self.cdf_impl::<P>(x, y)
    }

    /// Raw value at `(x, y)` by direct surface interpolation, regardless of
    /// the chosen policy.
    pub fn evaluate_exact(&self, x: f64, y: f64) -> f64 {
        self.density_impl::<Exact, _>(x, y, |d, y| d.evaluate(y))
    }

    /// Conditional density at `(x, y)` by direct surface interpolation.
    pub fn evaluate_pdf_exact(&self, x: f64, y: f64) -> f64 {
        self.density_impl::<Exact, _>(x, y, |d, y| d.evaluate_pdf(y))
    }

    /// Conditional CDF at `(x, y)` by direct surface interpolation.
    pub fn evaluate_cdf_exact(&self, x: f64, y: f64) -> f64 {
        self.cdf_impl::<Exact>(x, y)
    }

    /// Raw value at `(x, y)` with correlated unit-base mapping against
    /// explicit, pre-computed conditional support boundaries.
    pub fn evaluate_in_boundaries(&self, x: f64, y: f64, y_min: f64, y_max: f64) -> f64 {
        self.in_boundaries_impl(x, y, y_min, y_max, |d, y| d.evaluate(y))
    }

    /// Conditional density with explicit support boundaries.
    pub fn evaluate_pdf_in_boundaries(&self, x: f64, y: f64, y_min: f64, y_max: f64) -> f64 {
        self.in_boundaries_impl(x, y, y_min, y_max, |d, y| d.evaluate_pdf(y))
    }

    /// Conditional CDF with explicit support boundaries.
    pub fn evaluate_cdf_in_boundaries(&self, x: f64, y: f64, y_min: f64, y_max: f64) -> f64 {
        match self.grid.lookup(x) {
            Lookup::Lowest => self.grid.first().evaluate_cdf(y),
            Lookup::Below => {
                if self.extended {
                    self.grid.first().evaluate_cdf(y)
                } else {
                    0.0
                }
            }
            Lookup::Above => {
                if self.extended {
                    self.grid.last().evaluate_cdf(y)
                } else {
                    1.0
                }
            }
            Lookup::Pair { upper } => {
                correlated::cdf_in_boundaries::<I>(&self.pair(upper), x, y, y_min, y_max, &self.tol)
            }
        }
    }

    fn in_boundaries_impl<F>(&self, x: f64, y: f64, y_min: f64, y_max: f64, f: F) -> f64
    where
        F: Fn(&Continuous1D, f64) -> f64,
    {
        match self.grid.lookup(x) {
            Lookup::Lowest => f(self.grid.first(), y),
            Lookup::Below => {
                if self.extended {
                    f(self.grid.first(), y)
                } else {
                    0.0
                }
            }
            Lookup::Above => {
                if self.extended {
                    f(self.grid.last(), y)
                } else {
                    0.0
                }
            }
            Lookup::Pair { upper } => correlated::evaluate_in_boundaries::<I, F>(
                &self.pair(upper),
                x,
                y,
                y_min,
                y_max,
                &self.tol,
                f,
            ),
        }
    }

    /// Lower support bound of the conditional distribution at `x`
    /// (interpolated between the bounding entries); 0 outside the grid
    /// while limited.
    pub fn conditional_lower_bound(&self, x: f64) -> f64 {
        self.conditional_bound(x, |d| d.lower_bound())
    }

    /// Upper support bound of the conditional distribution at `x`; 0
    /// outside the grid while limited.
    pub fn conditional_upper_bound(&self, x: f64) -> f64 {
        self.conditional_bound(x, |d| d.upper_bound())
    }

    fn conditional_bound<F: Fn(&Continuous1D) -> f64>(&self, x: f64, bound: F) -> f64 {
        match self.grid.lookup(x) {
            Lookup::Lowest => bound(self.grid.first()),
            Lookup::Below => {
                if self.extended {
                    bound(self.grid.first())
                } else {
                    0.0
                }
            }
            Lookup::Above => {
                if self.extended {
                    bound(self.grid.last())
                } else {
                    0.0
                }
            }
            Lookup::Pair { upper } => {
                let pair = self.pair(upper);
                let beta = pair.fraction::<I>(x);
                interp::interpolate::<I::Secondary>(beta, bound(pair.lower), bound(pair.upper))
            }
        }
    }

    /// Draws one conditional sample at `x`. Fails with [`DomainError`] for
    /// out-of-range `x` while limited.
    pub fn sample<R: Rng>(&self, x: f64, rng: &mut R) -> Result<f64, DomainError> {
        self.sample_impl::<P, R>(x, rng).map(|(_, s)| s.value)
    }

    /// As [`sample`](Self::sample), incrementing `trials` by exactly one per
    /// invocation (including failed ones). The policies never reject, so the
    /// counter equals the number of calls.
    pub fn sample_and_record_trials<R: Rng>(
        &self,
        x: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<f64, DomainError> {
        *trials += 1;
        self.sample(x, rng)
    }

    /// As [`sample`](Self::sample), additionally reporting the attributed
    /// primary grid entry, the secondary-grid bin inside it, and the raw
    /// (pre-remapping) sample.
    pub fn sample_and_record_bins<R: Rng>(
        &self,
        x: f64,
        rng: &mut R,
    ) -> Result<BinSample, DomainError> {
        self.sample_impl::<P, R>(x, rng).map(|(primary_bin, s)| BinSample {
            value: s.value,
            raw: s.raw,
            primary_bin,
            secondary_bin: s.secondary_bin,
        })
    }

    /// Deterministic conditional sample for the deviate `u`; the basis of
    /// the round-trip guarantees with [`evaluate_cdf`](Self::evaluate_cdf).
    pub fn sample_with_random_number(&self, x: f64, u: f64) -> Result<f64, DomainError> {
        self.deterministic_impl::<P>(x, u)
    }

    /// Draws one conditional sample restricted to `y <= cap`. `cap` must lie
    /// above the conditional lower bound at `x`.
    pub fn sample_in_subrange<R: Rng>(
        &self,
        x: f64,
        cap: f64,
        rng: &mut R,
    ) -> Result<f64, DomainError> {
        let u = rng.gen::<f64>();
        self.subrange_impl::<P>(x, u, cap)
    }

    /// Deterministic subrange sample.
    pub fn sample_with_random_number_in_subrange(
        &self,
        x: f64,
        u: f64,
        cap: f64,
    ) -> Result<f64, DomainError> {
        self.subrange_impl::<P>(x, u, cap)
    }

    /// Draws one conditional sample by exact CDF inversion, regardless of
    /// the chosen policy.
    pub fn sample_exact<R: Rng>(&self, x: f64, rng: &mut R) -> Result<f64, DomainError> {
        self.sample_impl::<Exact, R>(x, rng).map(|(_, s)| s.value)
    }

    /// Deterministic exact sample for the deviate `u`.
    pub fn sample_exact_with_random_number(&self, x: f64, u: f64) -> Result<f64, DomainError> {
        self.deterministic_impl::<Exact>(x, u)
    }

    /// Exact sample restricted to `y <= cap`.
    pub fn sample_exact_in_subrange<R: Rng>(
        &self,
        x: f64,
        cap: f64,
        rng: &mut R,
    ) -> Result<f64, DomainError> {
        let u = rng.gen::<f64>();
        self.subrange_impl::<Exact>(x, u, cap)
    }

    /// Deterministic exact subrange sample.
    pub fn sample_exact_with_random_number_in_subrange(
        &self,
        x: f64,
        u: f64,
        cap: f64,
    ) -> Result<f64, DomainError> {
        self.subrange_impl::<Exact>(x, u, cap)
    }
}
