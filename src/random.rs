//! Deterministic random sources for tests
//!
//! Sampling entry points throughout the crate take `rng: &mut R` with
//! `R: Rng`, so any generator plugs in. [`FixedSequence`] replays a
//! prescribed list of unit-interval values through that interface, which
//! pins down otherwise-stochastic assertions; it plays the same role as
//! `rand`'s `mock::StepRng`.

use rand::{Error, RngCore};

/// An `RngCore` that replays a fixed sequence of values in `[0, 1)`.
///
/// Each stored value `v` is emitted so that `rng.gen::<f64>()` returns the
/// closest representable sample to `v` (exact whenever `v` is a multiple of
/// 2^-53). The sequence wraps around when exhausted, so a short stream can
/// drive a long assertion block.
#[derive(Clone, Debug)]
pub struct FixedSequence {
    values: Vec<u64>,
    index: usize,
}

impl FixedSequence {
    /// Creates a replay source from unit-interval values.
    ///
    /// # Panics
    /// If `values` is empty or any value lies outside `[0, 1)`.
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty());
        let values = values
            .iter()
            .map(|&v| {
                assert!(v >= 0.0 && v < 1.0, "stream value {} outside [0, 1)", v);
                // gen::<f64>() computes (next_u64 >> 11) * 2^-53
                ((v * (1u64 << 53) as f64).round() as u64).min((1 << 53) - 1) << 11
            })
            .collect();
        Self { values, index: 0 }
    }

    /// Rewinds the stream to its first value.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl RngCore for FixedSequence {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let v = self.values[self.index];
        self.index = (self.index + 1) % self.values.len();
        v
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn replays_unit_interval_values() {
        let mut rng = FixedSequence::new(&[0.0, 0.5, 1.0 - 1.0e-15]);
        assert_eq!(rng.gen::<f64>(), 0.0);
        assert_eq!(rng.gen::<f64>(), 0.5);
        let v: f64 = rng.gen();
        assert!((v - (1.0 - 1.0e-15)).abs() < 1.0e-15);
        assert!(v < 1.0);
    }

    #[test]
    fn wraps_around_when_exhausted() {
        let mut rng = FixedSequence::new(&[0.25, 0.75]);
        assert_eq!(rng.gen::<f64>(), 0.25);
        assert_eq!(rng.gen::<f64>(), 0.75);
        assert_eq!(rng.gen::<f64>(), 0.25);
    }

    #[test]
    fn reset_rewinds_the_stream() {
        let mut rng = FixedSequence::new(&[0.125, 0.625]);
        let _ = rng.gen::<f64>();
        rng.reset();
        assert_eq!(rng.gen::<f64>(), 0.125);
    }
}
