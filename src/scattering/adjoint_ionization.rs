//! Adjoint electroionization for a single atomic subshell
//!
//! The adjoint process promotes an electron from an incoming energy to a
//! higher outgoing energy, with the gain spectrum tabulated per incoming
//! energy. The tabular engine supplies the conditional spectrum; this layer
//! adds the subshell binding energy and the two-body kinematics that fix the
//! outgoing direction.

use rand::Rng;

use crate::error::{DomainError, GridError};
use crate::interp::LinLinLin;
use crate::twod::{
    CorrelatedTabular2D, ExactTabular2D, GridEntry, StochasticTabular2D,
};
use super::ELECTRON_REST_MASS_MEV;

/// How the conditional spectrum is interpolated and sampled. Chosen once at
/// construction and matched on for every call, in place of binding function
/// pointers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SamplingMethod {
    /// Unit-based interpolation with stochastic bin selection.
    UnitBasedStochastic,
    /// Unit-based interpolation with correlated sampling.
    UnitBasedCorrelated,
    /// Correlated-exact CDF inversion.
    Exact,
}

impl SamplingMethod {
    /// Maps the legacy `correlated_sampling_mode_on` /
    /// `unit_based_interpolation_mode_on` configuration flags onto a method.
    pub fn from_flags(correlated_sampling: bool, unit_based_interpolation: bool) -> Self {
        match (correlated_sampling, unit_based_interpolation) {
            (_, false) => SamplingMethod::Exact,
            (false, true) => SamplingMethod::UnitBasedStochastic,
            (true, true) => SamplingMethod::UnitBasedCorrelated,
        }
    }
}

enum GainSpectrum {
    UnitBased(StochasticTabular2D<LinLinLin>),
    Correlated(CorrelatedTabular2D<LinLinLin>),
    Exact(ExactTabular2D<LinLinLin>),
}

/// Adjoint electroionization scattering distribution for one subshell.
pub struct SubshellAdjointIonization {
    binding_energy: f64,
    spectrum: GainSpectrum,
}

impl SubshellAdjointIonization {
    /// Builds the distribution from the subshell binding energy (MeV), the
    /// tabulated gain spectrum grid, and the chosen sampling method.
    pub fn new(
        binding_energy: f64,
        entries: Vec<GridEntry>,
        method: SamplingMethod,
    ) -> Result<Self, GridError> {
        if !binding_energy.is_finite() || binding_energy <= 0.0 {
            return Err(GridError::negative_value("subshell binding energy"));
        }
        let spectrum = match method {
            SamplingMethod::UnitBasedStochastic => {
                GainSpectrum::UnitBased(StochasticTabular2D::new(entries)?)
            }
            SamplingMethod::UnitBasedCorrelated => {
                GainSpectrum::Correlated(CorrelatedTabular2D::new(entries)?)
            }
            SamplingMethod::Exact => GainSpectrum::Exact(ExactTabular2D::new(entries)?),
        };
        Ok(Self { binding_energy, spectrum })
    }

    /// As [`new`](Self::new), selecting the method from the legacy
    /// configuration flags.
    pub fn from_flags(
        binding_energy: f64,
        entries: Vec<GridEntry>,
        correlated_sampling: bool,
        unit_based_interpolation: bool,
    ) -> Result<Self, GridError> {
        Self::new(
            binding_energy,
            entries,
            SamplingMethod::from_flags(correlated_sampling, unit_based_interpolation),
        )
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    pub fn min_incoming_energy(&self) -> f64 {
        match &self.spectrum {
            GainSpectrum::UnitBased(d) => d.primary_lower_bound(),
            GainSpectrum::Correlated(d) => d.primary_lower_bound(),
            GainSpectrum::Exact(d) => d.primary_lower_bound(),
        }
    }

    pub fn max_incoming_energy(&self) -> f64 {
        match &self.spectrum {
            GainSpectrum::UnitBased(d) => d.primary_upper_bound(),
            GainSpectrum::Correlated(d) => d.primary_upper_bound(),
            GainSpectrum::Exact(d) => d.primary_upper_bound(),
        }
    }

    /// Allows incoming energies outside the tabulated range to clamp to the
    /// nearest grid edge.
    pub fn extend_beyond_tabulated_energies(&mut self) {
        match &mut self.spectrum {
            GainSpectrum::UnitBased(d) => d.extend_beyond_primary_limits(),
            GainSpectrum::Correlated(d) => d.extend_beyond_primary_limits(),
            GainSpectrum::Exact(d) => d.extend_beyond_primary_limits(),
        }
    }

    /// Conditional density of gaining energy `e_out` from `e_in`, in the
    /// method chosen at construction.
    pub fn evaluate_pdf(&self, e_in: f64, e_out: f64) -> f64 {
        match &self.spectrum {
            GainSpectrum::UnitBased(d) => d.evaluate_pdf(e_in, e_out),
            GainSpectrum::Correlated(d) => d.evaluate_pdf(e_in, e_out),
            GainSpectrum::Exact(d) => d.evaluate_pdf(e_in, e_out),
        }
    }

    /// Conditional cumulative probability of the gain spectrum.
    pub fn evaluate_cdf(&self, e_in: f64, e_out: f64) -> f64 {
        match &self.spectrum {
            GainSpectrum::UnitBased(d) => d.evaluate_cdf(e_in, e_out),
            GainSpectrum::Correlated(d) => d.evaluate_cdf(e_in, e_out),
            GainSpectrum::Exact(d) => d.evaluate_cdf(e_in, e_out),
        }
    }

    /// Samples an outgoing energy and the corresponding scattering angle
    /// cosine for an incoming electron of energy `e_in` (MeV).
    pub fn sample<R: Rng>(&self, e_in: f64, rng: &mut R) -> Result<(f64, f64), DomainError> {
        let e_out = match &self.spectrum {
            GainSpectrum::UnitBased(d) => d.sample(e_in, rng)?,
            GainSpectrum::Correlated(d) => d.sample(e_in, rng)?,
            GainSpectrum::Exact(d) => d.sample(e_in, rng)?,
        };
        Ok((e_out, outgoing_angle_cosine(e_in, e_out)))
    }

    /// As [`sample`](Self::sample), incrementing `trials` once per call.
    pub fn sample_and_record_trials<R: Rng>(
        &self,
        e_in: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<(f64, f64), DomainError> {
        *trials += 1;
        self.sample(e_in, rng)
    }
}

/// Scattering angle cosine for an adjoint electron promoted from `e_in` to
/// `e_out`, from relativistic two-body kinematics. Energies in MeV.
pub fn outgoing_angle_cosine(e_in: f64, e_out: f64) -> f64 {
    let two_m = 2.0 * ELECTRON_REST_MASS_MEV;
    let mu_sqr = e_in * (e_out + two_m) / (e_out * (e_in + two_m));
    mu_sqr.sqrt().min(1.0)
}
