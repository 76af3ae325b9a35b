//! Seal verification
//!
//! Order: coinbase role, fake-mode hooks, shared-engine delegation, then the
//! real check (positive difficulty, mix digest, `result <= MAX_UINT256 / difficulty`).

use std::thread;

use crate::chain::ChainReader;
use crate::consensus_pow::PowEngine;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::pow::{meets_target, target_for, PowHasher};
use crate::role::Role;
use crate::types::{short_hex, Header};

impl PowEngine {
    /// Check that `header` carries a valid proof-of-work from an eligible miner
    pub fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        self.verify_coinbase_role(chain, header)?;

        if self.pow_mode().is_fake() {
            let delay = self.config.fake_delay();
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            if self.config.fake_fail() == Some(header.number) {
                return Err(ConsensusError::InvalidPoW);
            }
            return Ok(());
        }

        if let Some(shared) = &self.shared {
            return shared.verify_seal(chain, header);
        }

        verify_pow(self.hasher.as_ref(), header)
    }

    /// The coinbase must be a miner in the parent's topology or an inner miner
    fn verify_coinbase_role(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()> {
        let graph = chain.graph_by_hash(&header.parent_hash).map_err(|e| {
            tracing::error!(number = header.number, error = %e, "[SEAL] parent topology lookup failed");
            ConsensusError::InvalidCoinbase
        })?;
        if graph.check_account_role(&header.coinbase, Role::Miner) {
            return Ok(());
        }

        let inner = chain.inner_miner_accounts(&header.parent_hash).map_err(|e| {
            tracing::error!(number = header.number, error = %e, "[SEAL] inner miner lookup failed");
            ConsensusError::InvalidCoinbase
        })?;
        if inner.contains(&header.coinbase) {
            return Ok(());
        }

        tracing::debug!(
            number = header.number,
            coinbase = %short_hex(&header.coinbase),
            "[SEAL] coinbase is not an eligible miner"
        );
        Err(ConsensusError::InvalidCoinbase)
    }
}

/// Recompute the seal hash and check digest and target
pub fn verify_pow(hasher: &dyn PowHasher, header: &Header) -> ConsensusResult<()> {
    let target = target_for(&header.difficulty).ok_or(ConsensusError::InvalidDifficulty)?;

    let (digest, result) = hasher.compute(&header.hash_no_nonce(), header.nonce, header.number);
    if digest != header.mix_digest {
        tracing::warn!(
            number = header.number,
            have = %hex::encode(header.mix_digest),
            want = %hex::encode(digest),
            "[SEAL] mix digest mismatch"
        );
        return Err(ConsensusError::InvalidMixDigest);
    }
    if !meets_target(&result, &target) {
        return Err(ConsensusError::InvalidPoW);
    }
    Ok(())
}
