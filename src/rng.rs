//! Random number generation for the performed-chart search.
//!
//! The search's tie-breaking must be seedable and reproducible, so a
//! generator is always injected by the caller; the crate never consults a
//! process-global source of randomness.
//!
//! # Implementations
//!
//! ## [`RngMock`]
//!
//! A deterministic mock that returns predefined values in rotation, for
//! reproducible tests.
//!
//! ## [`RandRng`]
//!
//! A production implementation behind the `rand` feature, wrapping a
//! [`rand::rngs::StdRng`] seeded from a caller-supplied value.

use core::ops::RangeInclusive;

/// A random number generator injected into the performed-chart search.
///
/// # Contract
///
/// - The generated number must be within the given `range` (inclusive).
/// - Implementations should be deterministic under a fixed seed so that
///   searches are reproducible.
pub trait Rng {
    /// Generates a random integer within `range`.
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64;
}

impl<T: Rng + ?Sized> Rng for Box<T> {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        T::generate(self, range)
    }
}

impl<T: Rng + ?Sized> Rng for &mut T {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        T::generate(self, range)
    }
}

/// A deterministic mock generator returning values from an array in
/// rotation.
///
/// Values outside the requested range are reduced into it, so any constant
/// array yields a valid (if heavily biased) generator.
///
/// # Examples
///
/// ```
/// use restep::rng::{Rng, RngMock};
///
/// let mut rng = RngMock([1, 2]);
/// assert_eq!(rng.generate(0..=10), 1);
/// assert_eq!(rng.generate(0..=10), 2);
/// assert_eq!(rng.generate(0..=10), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RngMock<const N: usize>(pub [u64; N]);

impl<const N: usize> Rng for RngMock<N> {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        let Some(first) = self.0.first().copied() else {
            return *range.start();
        };
        self.0.rotate_left(1);
        let span = range.end() - range.start() + 1;
        range.start() + first % span
    }
}

/// A seeded production generator over [`rand::rngs::StdRng`].
#[cfg(feature = "rand")]
#[derive(Debug)]
pub struct RandRng(rand::rngs::StdRng);

#[cfg(feature = "rand")]
impl RandRng {
    /// Creates a generator from a seed. Equal seeds produce equal streams.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

#[cfg(feature = "rand")]
impl Rng for RandRng {
    fn generate(&mut self, range: RangeInclusive<u64>) -> u64 {
        use rand::RngExt as _;
        self.0.random_range(range)
    }
}

/// Fisher-Yates shuffle driven by an injected [`Rng`].
pub(crate) fn shuffle<T>(rng: &mut dyn Rng, slice: &mut [T]) {
    for i in (1..slice.len()).rev() {
        let j = rng.generate(0..=i as u64) as usize;
        slice.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_rotates_and_clamps() {
        let mut rng = RngMock([7, 12]);
        assert_eq!(rng.generate(0..=9), 7);
        assert_eq!(rng.generate(0..=9), 2);
        assert_eq!(rng.generate(0..=9), 7);
    }

    #[test]
    fn shuffle_is_reproducible() {
        let mut a = [1, 2, 3, 4, 5];
        let mut b = [1, 2, 3, 4, 5];
        shuffle(&mut RngMock([3, 1, 4, 1, 5]), &mut a);
        shuffle(&mut RngMock([3, 1, 4, 1, 5]), &mut b);
        assert_eq!(a, b);
    }

    #[cfg(feature = "rand")]
    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = RandRng::from_seed(42);
        let mut b = RandRng::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.generate(0..=1000), b.generate(0..=1000));
        }
    }
}
