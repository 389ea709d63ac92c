//! Construction and sampling errors

use std::fmt;
use std::error::Error;

/// Why did construction of a distribution fail?
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GridErrorKind {
    TooFewEntries,
    Unordered,
    EmptySupport,
    NegativeValue,
    ZeroIntegral,
    LengthMismatch,
    NotRepresentable,
}

/// Error returned when a distribution is built from malformed input.
pub struct GridError {
    kind: GridErrorKind,
    cause: String,
}

impl fmt::Debug for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            GridErrorKind::TooFewEntries => write!(f, "A tabulated grid needs at least two entries: {}", self.cause),
            GridErrorKind::Unordered => write!(f, "Grid values must be non-decreasing: {}", self.cause),
            GridErrorKind::EmptySupport => write!(f, "Distribution support is empty: {}", self.cause),
            GridErrorKind::NegativeValue => write!(f, "Tabulated values must be non-negative: {}", self.cause),
            GridErrorKind::ZeroIntegral => write!(f, "Tabulated values integrate to zero: {}", self.cause),
            GridErrorKind::LengthMismatch => write!(f, "Parallel arrays have different lengths: {}", self.cause),
            GridErrorKind::NotRepresentable => write!(f, "Value is not representable on the chosen interpolation axis: {}", self.cause),
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for GridError {}

impl GridError {
    pub fn too_few_entries(cause: &str) -> Self {
        Self { kind: GridErrorKind::TooFewEntries, cause: cause.to_owned() }
    }

    pub fn unordered(cause: &str) -> Self {
        Self { kind: GridErrorKind::Unordered, cause: cause.to_owned() }
    }

    pub fn empty_support(cause: &str) -> Self {
        Self { kind: GridErrorKind::EmptySupport, cause: cause.to_owned() }
    }

    pub fn negative_value(cause: &str) -> Self {
        Self { kind: GridErrorKind::NegativeValue, cause: cause.to_owned() }
    }

    pub fn zero_integral(cause: &str) -> Self {
        Self { kind: GridErrorKind::ZeroIntegral, cause: cause.to_owned() }
    }

    pub fn length_mismatch(cause: &str) -> Self {
        Self { kind: GridErrorKind::LengthMismatch, cause: cause.to_owned() }
    }

    pub fn not_representable(cause: &str) -> Self {
        Self { kind: GridErrorKind::NotRepresentable, cause: cause.to_owned() }
    }

    pub fn kind(&self) -> GridErrorKind {
        self.kind
    }
}

/// Error returned when a sample is requested for a primary value outside
/// the tabulated range while the distribution is limited to its grid.
///
/// Evaluation never produces this error (densities are legitimately zero
/// outside the support); only sample-type calls do.
#[derive(Copy, Clone, PartialEq)]
pub struct DomainError {
    primary: f64,
    min: f64,
    max: f64,
}

impl fmt::Debug for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Distribution is not defined at primary value {:e} (grid covers {:e} to {:e} and extension is disabled)",
            self.primary, self.min, self.max
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn new(primary: f64, min: f64, max: f64) -> Self {
        Self { primary, min, max }
    }

    pub fn primary(&self) -> f64 {
        self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = DomainError::new(-1.0, 0.0, 2.0);
        let msg = format!("{}", err);
        assert!(msg.contains("-1e0"));
        assert!(msg.contains("extension is disabled"));

        let err = GridError::unordered("primary grid");
        assert_eq!(err.kind(), GridErrorKind::Unordered);
        assert!(format!("{}", err).contains("non-decreasing"));
    }
}
