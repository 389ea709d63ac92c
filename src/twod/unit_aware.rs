//! Unit-tagged facade over the tabular two-dimensional engine
//!
//! The engine itself works in raw `f64` coordinates; this wrapper pins a
//! primary unit, a secondary unit and a dependent-value unit to an instance
//! at the type level. The tags are phantom, so the facade costs nothing at
//! runtime, and mixing quantities of different units at the call sites is a
//! compile error.

use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;

use crate::error::{DomainError, GridError};
use crate::interp::{Tolerance, TwoDInterpolation};
use crate::oned::Continuous1D;
use crate::units::{Barn, MegaElectronVolt, Quantity, Unit};
use super::{GridEntry, InterpolatedTabular2D, SamplingScheme};

/// A tabular two-dimensional distribution whose primary variable carries
/// unit `PU`, secondary variable unit `SU`, and raw dependent values unit
/// `DU`.
#[derive(Clone, Debug)]
pub struct UnitAware2D<PU, SU, DU, I, P> {
    inner: InterpolatedTabular2D<I, P>,
    units: PhantomData<(PU, SU, DU)>,
}

/// The common transport-data instantiation: secondary energy spectra in
/// barns, conditioned on energy.
pub type EnergySpectrum2D<I, P> =
    UnitAware2D<MegaElectronVolt, MegaElectronVolt, Barn, I, P>;

impl<PU, SU, DU, I, P> UnitAware2D<PU, SU, DU, I, P>
where
    PU: Unit,
    SU: Unit,
    DU: Unit,
    I: TwoDInterpolation,
    P: SamplingScheme,
{
    /// Builds the distribution from unit-tagged primary values and per-point
    /// secondary distributions (tabulated in `SU` coordinates).
    pub fn new(entries: Vec<(Quantity<PU>, Arc<Continuous1D>)>) -> Result<Self, GridError> {
        Self::with_tolerances(entries, Tolerance::default())
    }

    /// As [`new`](Self::new), with explicit tolerances.
    pub fn with_tolerances(
        entries: Vec<(Quantity<PU>, Arc<Continuous1D>)>,
        tol: Tolerance,
    ) -> Result<Self, GridError> {
        let entries: Vec<GridEntry> =
            entries.into_iter().map(|(x, d)| (x.value(), d)).collect();
        Ok(Self {
            inner: InterpolatedTabular2D::with_tolerances(entries, tol)?,
            units: PhantomData,
        })
    }

    /// Wraps an existing raw-valued distribution.
    pub fn from_raw(inner: InterpolatedTabular2D<I, P>) -> Self {
        Self { inner, units: PhantomData }
    }

    /// The raw-valued engine underneath.
    pub fn raw(&self) -> &InterpolatedTabular2D<I, P> {
        &self.inner
    }

    pub fn extend_beyond_primary_limits(&mut self) {
        self.inner.extend_beyond_primary_limits();
    }

    pub fn limit_to_primary_limits(&mut self) {
        self.inner.limit_to_primary_limits();
    }

    pub fn extends_beyond_primary_limits(&self) -> bool {
        self.inner.extends_beyond_primary_limits()
    }

    pub fn primary_lower_bound(&self) -> Quantity<PU> {
        Quantity::new(self.inner.primary_lower_bound())
    }

    pub fn primary_upper_bound(&self) -> Quantity<PU> {
        Quantity::new(self.inner.primary_upper_bound())
    }

    pub fn has_same_primary_bounds(&self, other: &Self) -> bool {
        self.inner.has_same_primary_bounds(&other.inner)
    }

    pub fn conditional_lower_bound(&self, x: Quantity<PU>) -> Quantity<SU> {
        Quantity::new(self.inner.conditional_lower_bound(x.value()))
    }

    pub fn conditional_upper_bound(&self, x: Quantity<PU>) -> Quantity<SU> {
        Quantity::new(self.inner.conditional_upper_bound(x.value()))
    }

    /// Raw tabulated value at `(x, y)`, in `DU`.
    pub fn evaluate(&self, x: Quantity<PU>, y: Quantity<SU>) -> Quantity<DU> {
        Quantity::new(self.inner.evaluate(x.value(), y.value()))
    }

    /// Conditional density at `(x, y)`, in inverse secondary units.
    pub fn evaluate_pdf(&self, x: Quantity<PU>, y: Quantity<SU>) -> Quantity<SU::Inverse> {
        Quantity::new(self.inner.evaluate_pdf(x.value(), y.value()))
    }

    /// Conditional cumulative probability, dimensionless.
    pub fn evaluate_cdf(&self, x: Quantity<PU>, y: Quantity<SU>) -> f64 {
        self.inner.evaluate_cdf(x.value(), y.value())
    }

    pub fn evaluate_exact(&self, x: Quantity<PU>, y: Quantity<SU>) -> Quantity<DU> {
        Quantity::new(self.inner.evaluate_exact(x.value(), y.value()))
    }

    pub fn evaluate_pdf_exact(&self, x: Quantity<PU>, y: Quantity<SU>) -> Quantity<SU::Inverse> {
        Quantity::new(self.inner.evaluate_pdf_exact(x.value(), y.value()))
    }

    pub fn evaluate_cdf_exact(&self, x: Quantity<PU>, y: Quantity<SU>) -> f64 {
        self.inner.evaluate_cdf_exact(x.value(), y.value())
    }

    /// Conditional density against explicit pre-computed support boundaries.
    pub fn evaluate_pdf_in_boundaries(
        &self,
        x: Quantity<PU>,
        y: Quantity<SU>,
        y_min: Quantity<SU>,
        y_max: Quantity<SU>,
    ) -> Quantity<SU::Inverse> {
        Quantity::new(self.inner.evaluate_pdf_in_boundaries(
            x.value(),
            y.value(),
            y_min.value(),
            y_max.value(),
        ))
    }

    /// Conditional CDF against explicit pre-computed support boundaries.
    pub fn evaluate_cdf_in_boundaries(
        &self,
        x: Quantity<PU>,
        y: Quantity<SU>,
        y_min: Quantity<SU>,
        y_max: Quantity<SU>,
    ) -> f64 {
        self.inner.evaluate_cdf_in_boundaries(
            x.value(),
            y.value(),
            y_min.value(),
            y_max.value(),
        )
    }

    pub fn sample<R: Rng>(
        &self,
        x: Quantity<PU>,
        rng: &mut R,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample(x.value(), rng).map(Quantity::new)
    }

    pub fn sample_and_record_trials<R: Rng>(
        &self,
        x: Quantity<PU>,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample_and_record_trials(x.value(), rng, trials).map(Quantity::new)
    }

    pub fn sample_with_random_number(
        &self,
        x: Quantity<PU>,
        u: f64,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample_with_random_number(x.value(), u).map(Quantity::new)
    }

    pub fn sample_in_subrange<R: Rng>(
        &self,
        x: Quantity<PU>,
        cap: Quantity<SU>,
        rng: &mut R,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample_in_subrange(x.value(), cap.value(), rng).map(Quantity::new)
    }

    pub fn sample_with_random_number_in_subrange(
        &self,
        x: Quantity<PU>,
        u: f64,
        cap: Quantity<SU>,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner
            .sample_with_random_number_in_subrange(x.value(), u, cap.value())
            .map(Quantity::new)
    }

    pub fn sample_exact<R: Rng>(
        &self,
        x: Quantity<PU>,
        rng: &mut R,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample_exact(x.value(), rng).map(Quantity::new)
    }

    pub fn sample_exact_with_random_number(
        &self,
        x: Quantity<PU>,
        u: f64,
    ) -> Result<Quantity<SU>, DomainError> {
        self.inner.sample_exact_with_random_number(x.value(), u).map(Quantity::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::LinLinLin;
    use crate::oned::{TabularDistribution, UniformDistribution};
    use crate::twod::Stochastic;
    use crate::units::Energy;

    fn reference() -> EnergySpectrum2D<LinLinLin, Stochastic> {
        let uniform: Arc<Continuous1D> =
            Arc::new(UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into());
        let tabular: Arc<Continuous1D> = Arc::new(
            TabularDistribution::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5]).unwrap().into(),
        );
        EnergySpectrum2D::new(vec![
            (Energy::new(0.0), Arc::clone(&uniform)),
            (Energy::new(1.0), tabular),
            (Energy::new(2.0), uniform),
        ])
        .unwrap()
    }

    #[test]
    fn quantities_flow_through_the_facade() {
        let d = reference();
        let v = d.evaluate(Energy::new(0.5), Energy::new(1.25));
        assert!((v.value() - 0.7).abs() < 1.0e-15);

        let pdf = d.evaluate_pdf(Energy::new(0.5), Energy::new(5.0));
        // density times an energy interval is dimensionless
        let weight = Energy::new(1.0) * pdf;
        assert!(weight > 0.0);

        assert_eq!(d.conditional_upper_bound(Energy::new(0.5)), Energy::new(8.75));
        assert_eq!(d.primary_upper_bound(), Energy::new(2.0));
    }

    #[test]
    fn sampling_returns_tagged_secondary_values() {
        let d = reference();
        let y = d.sample_with_random_number(Energy::new(0.5), 0.0).unwrap();
        assert!((y - Energy::new(1.25)).value().abs() < 1.0e-14);
        assert!(d.sample_with_random_number(Energy::new(-1.0), 0.5).is_err());
    }
}
