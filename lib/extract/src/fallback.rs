//! Seeded fallback vectors.
//!
//! When an image cannot be measured, a pseudo-random vector derived from a
//! seed string (usually the image path or URL) stands in for it. The same seed
//! always yields the same vector.

use vismatch_core::FeatureVector;

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MODULUS: u64 = 1 << 31;

/// Value band per quarter of the vector
const BANDS: [(f32, f32); 4] = [(0.2, 0.8), (0.1, 0.9), (0.0, 1.0), (0.15, 0.85)];

/// Linear congruential generator seeded from a string hash
#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn from_seed(seed: &str) -> Self {
        let hash = seed
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        Self {
            state: u64::from(hash) % LCG_MODULUS,
        }
    }

    /// Next value in [0, 1)
    fn next_unit(&mut self) -> f32 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        (self.state as f64 / LCG_MODULUS as f64) as f32
    }
}

/// Deterministic stand-in vector for `seed`
pub fn fallback_features(seed: &str, dim: usize) -> FeatureVector {
    let mut rng = Lcg::from_seed(seed);
    let data = (0..dim)
        .map(|i| {
            let (lo, hi) = BANDS[(i * 4 / dim).min(3)];
            lo + (hi - lo) * rng.next_unit()
        })
        .collect();
    FeatureVector::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_vector() {
        let a = fallback_features("https://cdn.example.com/p/17.jpg", 64);
        let b = fallback_features("https://cdn.example.com/p/17.jpg", 64);
        assert_eq!(a, b);
        assert_eq!(a.dim(), 64);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = fallback_features("images/a.png", 64);
        let b = fallback_features("images/b.png", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_values_stay_in_bands() {
        let v = fallback_features("seed", 64);
        for (i, x) in v.as_slice().iter().enumerate() {
            let (lo, hi) = BANDS[i / 16];
            assert!(*x >= lo && *x <= hi, "position {} value {} outside {}..{}", i, x, lo, hi);
        }
    }

    #[test]
    fn test_not_degenerate() {
        let v = fallback_features("", 64);
        assert!(v.is_finite());
        let first = v.as_slice()[0];
        assert!(v.as_slice().iter().any(|x| *x != first));
    }
}
