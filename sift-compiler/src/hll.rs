//! HyperLogLog state for approximate distinct counts.
//!
//! The aggregate kernel folds 128-bit value hashes into a byte-per-bucket
//! sketch; this module owns the layout, the estimator, and the merge rule so
//! the compiler, the reducers, and the tests agree on all three.

use thiserror::Error;

/// Supported precision range: `1 << precision` buckets.
pub const MIN_PRECISION: u8 = 4;
/// Upper end of the supported precision range.
pub const MAX_PRECISION: u8 = 16;

/// Errors from HyperLogLog buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HllError {
    /// Precision outside `4..=16`.
    #[error("precision {0} outside {MIN_PRECISION}..={MAX_PRECISION}")]
    BadPrecision(u8),
    /// Merge of two sketches with different bucket counts.
    #[error("cannot merge sketches of {0} and {1} buckets")]
    SizeMismatch(usize, usize),
}

/// A byte-per-bucket HyperLogLog sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HllState {
    precision: u8,
    buckets: Vec<u8>,
}

impl HllState {
    /// An empty sketch at the given precision.
    pub fn new(precision: u8) -> Result<Self, HllError> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(HllError::BadPrecision(precision));
        }
        Ok(HllState {
            precision,
            buckets: vec![0; 1 << precision],
        })
    }

    /// The sketch precision.
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Raw bucket bytes, `1 << precision` of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buckets
    }

    /// Bytes one sketch occupies in the aggregate buffer.
    pub const fn size(&self) -> usize {
        1 << self.precision
    }

    /// Fold one 128-bit hash into the sketch.
    ///
    /// The top `precision` bits select the bucket; the bucket keeps the
    /// maximum over `leading_zeros(residual) + 1`.
    pub fn update(&mut self, hash: u128) {
        let bucket = (hash >> (128 - self.precision as u32)) as usize;
        let residual = hash << self.precision;
        let rank = (residual.leading_zeros() + 1).min(u8::MAX as u32) as u8;
        if rank > self.buckets[bucket] {
            self.buckets[bucket] = rank;
        }
    }

    /// Merge another sketch into this one: per-byte maximum.
    pub fn merge(&mut self, other: &HllState) -> Result<(), HllError> {
        if self.buckets.len() != other.buckets.len() {
            return Err(HllError::SizeMismatch(
                self.buckets.len(),
                other.buckets.len(),
            ));
        }
        for (b, o) in self.buckets.iter_mut().zip(&other.buckets) {
            *b = (*b).max(*o);
        }
        Ok(())
    }

    /// Estimate the distinct count.
    pub fn estimate(&self) -> f64 {
        let m = self.buckets.len() as f64;
        let alpha = match self.buckets.len() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        };
        let h: f64 = self
            .buckets
            .iter()
            .map(|&b| (-(b as f64)).exp2())
            .sum();
        let mut e = alpha * m * m / h;
        if e < 2.5 * m {
            let zeros = self.buckets.iter().filter(|&&b| b == 0).count();
            if zeros > 0 {
                e = m * (m / zeros as f64).ln();
            }
        }
        const TWO32: f64 = 4_294_967_296.0;
        if e > TWO32 / 30.0 {
            e = -TWO32 * (1.0 - e / TWO32).ln();
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_bounds_are_enforced() {
        assert!(HllState::new(3).is_err());
        assert!(HllState::new(17).is_err());
        assert_eq!(HllState::new(12).unwrap().size(), 4096);
    }

    #[test]
    fn update_keeps_the_maximum_rank() {
        let mut s = HllState::new(4).unwrap();
        // bucket = top 4 bits; residual shifted left by 4
        s.update(0xf000_0000_0000_0000_0000_0000_0000_0001);
        let first = s.as_bytes()[0xf];
        assert!(first > 1);
        s.update(0xffff_0000_0000_0000_0000_0000_0000_0000);
        assert_eq!(s.as_bytes()[0xf], first, "lower rank must not overwrite");
    }

    #[test]
    fn mismatched_merge_is_rejected() {
        let mut a = HllState::new(4).unwrap();
        let b = HllState::new(5).unwrap();
        assert_eq!(a.merge(&b), Err(HllError::SizeMismatch(16, 32)));
    }
}
