//! Unit-tagged scalar quantities
//!
//! A [`Quantity`] wraps an `f64` with a zero-sized unit tag, so mixing units
//! is a type error rather than a runtime check, and the wrapper compiles away
//! entirely. Only the arithmetic that is dimensionally meaningful is
//! implemented: same-unit addition and subtraction, scaling by bare floats,
//! same-unit ratios, and multiplication by the paired inverse unit. Anything
//! else fails to compile.
//!
//! ```
//! use skua::units::{Energy, Quantity};
//! let e = Energy::new(1.5) + Energy::new(0.5);
//! assert_eq!((e / Energy::new(0.5)), 4.0);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A unit tag. Each unit names its inverse, and the pairing is symmetric.
pub trait Unit: Copy + Clone + fmt::Debug + PartialEq {
    type Inverse: Unit<Inverse = Self>;
    const SYMBOL: &'static str;
}

/// Mega-electronvolts, the energy unit of the transport data this crate
/// serves.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MegaElectronVolt;

/// Inverse mega-electronvolts (e.g. an energy probability density).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerMegaElectronVolt;

/// Barns, the cross-section unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Barn;

/// Inverse barns.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerBarn;

/// The trivial unit; `Quantity<Dimensionless>` behaves like a plain float.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dimensionless;

impl Unit for MegaElectronVolt {
    type Inverse = PerMegaElectronVolt;
    const SYMBOL: &'static str = "MeV";
}

impl Unit for PerMegaElectronVolt {
    type Inverse = MegaElectronVolt;
    const SYMBOL: &'static str = "1/MeV";
}

impl Unit for Barn {
    type Inverse = PerBarn;
    const SYMBOL: &'static str = "b";
}

impl Unit for PerBarn {
    type Inverse = Barn;
    const SYMBOL: &'static str = "1/b";
}

impl Unit for Dimensionless {
    type Inverse = Dimensionless;
    const SYMBOL: &'static str = "";
}

/// A scalar carrying a compile-time unit tag.
#[derive(Copy, Clone, Debug)]
pub struct Quantity<U: Unit> {
    value: f64,
    unit: PhantomData<U>,
}

/// An energy in MeV.
pub type Energy = Quantity<MegaElectronVolt>;

/// A probability density over energy, in 1/MeV.
pub type EnergyDensity = Quantity<PerMegaElectronVolt>;

/// A cross section in barns.
pub type CrossSection = Quantity<Barn>;

impl<U: Unit> Quantity<U> {
    /// Tags a raw value with this unit.
    pub fn new(value: f64) -> Quantity<U> {
        Quantity { value, unit: PhantomData }
    }

    /// The additive identity.
    pub fn zero() -> Quantity<U> {
        Quantity::new(0.0)
    }

    /// Strips the unit tag.
    pub fn value(self) -> f64 {
        self.value
    }

    /// The reciprocal, carrying the paired inverse unit.
    pub fn recip(self) -> Quantity<U::Inverse> {
        Quantity::new(1.0 / self.value)
    }
}

impl<U: Unit> PartialEq for Quantity<U> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<U: Unit> PartialOrd for Quantity<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<U: Unit> fmt::Display for Quantity<U> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if U::SYMBOL.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, U::SYMBOL)
        }
    }
}

impl<U: Unit> Add for Quantity<U> {
    type Output = Quantity<U>;

    fn add(self, other: Quantity<U>) -> Quantity<U> {
        Quantity::new(self.value + other.value)
    }
}

impl<U: Unit> Sub for Quantity<U> {
    type Output = Quantity<U>;

    fn sub(self, other: Quantity<U>) -> Quantity<U> {
        Quantity::new(self.value - other.value)
    }
}

impl<U: Unit> Neg for Quantity<U> {
    type Output = Quantity<U>;

    fn neg(self) -> Quantity<U> {
        Quantity::new(-self.value)
    }
}

impl<U: Unit> Mul<f64> for Quantity<U> {
    type Output = Quantity<U>;

    fn mul(self, scale: f64) -> Quantity<U> {
        Quantity::new(self.value * scale)
    }
}

impl<U: Unit> Mul<Quantity<U>> for f64 {
    type Output = Quantity<U>;

    fn mul(self, q: Quantity<U>) -> Quantity<U> {
        Quantity::new(self * q.value)
    }
}

impl<U: Unit> Div<f64> for Quantity<U> {
    type Output = Quantity<U>;

    fn div(self, scale: f64) -> Quantity<U> {
        Quantity::new(self.value / scale)
    }
}

/// Same-unit ratio: the units cancel.
impl<U: Unit> Div for Quantity<U> {
    type Output = f64;

    fn div(self, other: Quantity<U>) -> f64 {
        self.value / other.value
    }
}

/// A quantity times its paired inverse is dimensionless.
impl<U: Unit> Mul<Quantity<U::Inverse>> for Quantity<U> {
    type Output = f64;

    fn mul(self, other: Quantity<U::Inverse>) -> f64 {
        self.value * other.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_preserves_the_tag() {
        let e = Energy::new(2.0) + Energy::new(1.0) - Energy::new(0.5);
        assert_eq!(e.value(), 2.5);
        assert_eq!((2.0 * e).value(), 5.0);
        assert_eq!((e / 2.5).value(), 1.0);
        assert_eq!(-e, Energy::new(-2.5));
    }

    #[test]
    fn ratios_and_inverses_are_dimensionless() {
        let e = Energy::new(4.0);
        assert_eq!(e / Energy::new(2.0), 2.0);
        let density = EnergyDensity::new(0.25);
        assert_eq!(e * density, 1.0);
        assert_eq!(e.recip() * e.value(), EnergyDensity::new(1.0) * 1.0);
    }

    #[test]
    fn comparisons_and_display() {
        assert!(Energy::new(1.0) < Energy::new(2.0));
        assert_eq!(format!("{}", Energy::new(1.5)), "1.5 MeV");
        assert_eq!(format!("{}", Quantity::<Dimensionless>::new(0.5)), "0.5");
    }
}
