//! Physics scattering distributions built on the tabular engine

/// Electron rest mass energy in MeV.
pub const ELECTRON_REST_MASS_MEV: f64 = 0.510998910;

mod adjoint_ionization;
pub use self::adjoint_ionization::*;
