//! Proof-of-work hashing primitive and target arithmetic

pub mod mix;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use crate::types::Hash;

pub use mix::{LightMix, MixParams};

/// 2^256 - 1
pub static MAX_UINT256: Lazy<BigUint> = Lazy::new(|| (BigUint::one() << 256u32) - 1u32);

/// Seal hashing primitive
///
/// Given the seal-less header hash, the nonce and the block number (for
/// dataset epoch selection), returns `(mix_digest, result)`.
pub trait PowHasher: Send + Sync {
    fn compute(&self, seed: &Hash, nonce: u64, number: u64) -> (Hash, Hash);
}

/// Acceptance target `MAX_UINT256 / difficulty` (None for zero difficulty)
pub fn target_for(difficulty: &BigUint) -> Option<BigUint> {
    if difficulty.is_zero() {
        return None;
    }
    Some(&*MAX_UINT256 / difficulty)
}

/// Whether a big-endian hash result meets `target`
pub fn meets_target(result: &Hash, target: &BigUint) -> bool {
    BigUint::from_bytes_be(result) <= *target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_arithmetic() {
        assert_eq!(target_for(&BigUint::zero()), None);
        assert_eq!(target_for(&BigUint::one()).unwrap(), *MAX_UINT256);
        assert_eq!(
            target_for(&BigUint::from(2u32)).unwrap(),
            &*MAX_UINT256 >> 1u32
        );
    }

    #[test]
    fn test_meets_target() {
        let target = target_for(&BigUint::from(256u32)).unwrap();
        let mut easy = [0u8; 32];
        easy[1] = 0xff;
        let mut hard = [0u8; 32];
        hard[0] = 0x01;
        assert!(meets_target(&easy, &target));
        assert!(!meets_target(&hard, &target));
        assert!(meets_target(&[0xff; 32], &MAX_UINT256));
    }
}
