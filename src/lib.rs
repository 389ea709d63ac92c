//! Tabular distribution engines for Monte Carlo particle transport
//!
//! The centerpiece is [`twod::InterpolatedTabular2D`]: a probability
//! distribution over a secondary variable (say, outgoing energy) conditioned
//! on a primary variable (incoming energy), tabulated as a grid of
//! one-dimensional distributions and interpolated between grid points. The
//! interpolation scheme and the sampling policy — unit-based stochastic,
//! unit-based correlated, or correlated-exact — are both type parameters, so
//! swapping them costs nothing at runtime.
//!
//! Sampling everywhere takes `rng: &mut R` with `R: Rng`; tests pin results
//! with [`random::FixedSequence`]. The [`units`] module supplies phantom-unit
//! quantities and [`twod::UnitAware2D`] a typed facade over the engine.
//! [`scattering`] holds the physics distributions built on top.

pub mod error;
pub mod interp;
pub mod oned;
pub mod random;
pub mod rootfind;
pub mod scattering;
pub mod twod;
pub mod units;

pub use error::{DomainError, GridError};
pub use interp::{LinLinLin, LinLinLog, LinLogLin, LinLogLog, Tolerance};
pub use oned::{
    Continuous1D, OneDimensional, Sample1D, TabularDistribution, UniformDistribution,
};
pub use twod::{
    BinSample, Correlated, CorrelatedTabular2D, Exact, ExactTabular2D, InterpolatedTabular2D,
    SamplingScheme, Stochastic, StochasticTabular2D, UnitAware2D,
};
