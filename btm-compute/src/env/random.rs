//! The seeded random generator owned by an environment.

use btm_parser::Number;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// The seed used when none is given.
pub const DEFAULT_SEED: u64 = 1234;

/// Hashes a textual seed. Decimal text maps to its own value.
pub fn seed_from_str(seed: &str) -> u64 {
    if let Ok(n) = seed.trim().parse::<u64>() {
        return n;
    }

    // FNV-1a
    seed.bytes().fold(0xcbf2_9ce4_8422_2325, |hash: u64, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// A deterministic pseudo-random generator. Two generators created with the same seed produce
/// the same sequence of values.
#[derive(Debug, Clone)]
pub struct Random {
    rng: StdRng,
}

impl Default for Random {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Random {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Returns a uniformly distributed integer in `min..=max`.
    pub fn rand_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Returns a rational number whose numerator and denominator are drawn from the given
    /// inclusive ranges.
    pub fn rand_rational(&mut self, numer: (i64, i64), denom: (i64, i64)) -> Number {
        let p = self.rand_int(numer.0, numer.1);
        let q = self.rand_int(denom.0.max(1), denom.1.max(1));
        Number::rational(p, q)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn deterministic() {
        let mut a = Random::new(42);
        let mut b = Random::new(42);
        let xs = (0..10).map(|_| a.rand_int(-20, 20)).collect::<Vec<_>>();
        let ys = (0..10).map(|_| b.rand_int(-20, 20)).collect::<Vec<_>>();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (-20..=20).contains(x)));
    }

    #[test]
    fn textual_seeds() {
        assert_eq!(seed_from_str("1234"), 1234);
        assert_eq!(seed_from_str("problem-7"), seed_from_str("problem-7"));
        assert!(seed_from_str("problem-7") != seed_from_str("problem-8"));
    }

    #[test]
    fn rationals_in_range() {
        let mut rng = Random::default();
        for _ in 0..50 {
            let n = rng.rand_rational((-20, 20), (1, 15));
            assert!(n.is_rational());
            assert!(n.value().abs() <= 20.0);
        }
    }
}
