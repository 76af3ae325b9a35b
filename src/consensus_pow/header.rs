//! Single-header validation
//!
//! Rules run in a fixed order and the first violation is returned:
//! 1. extra-data size
//! 2. timestamp bound (256-bit for uncles, now + allowance otherwise) and
//!    strict increase over the parent
//! 3. difficulty, unless the header is a super header
//! 4. gas limit <= 2^63 - 1
//! 5. gas used <= gas limit
//! 6. gas limit drift strictly below `parent / divisor`, and >= the floor
//! 7. number == parent + 1
//! 8. seal (optional), then the hard-fork extra rules

use num_bigint::BigUint;

use crate::chain::ChainReader;
use crate::config::{ChainConfig, PowMode};
use crate::consensus_pow::difficulty::calc_difficulty;
use crate::consensus_pow::PowEngine;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::pow::MAX_UINT256;
use crate::types::Header;

/// Upper bound on any gas limit
pub const MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;

impl PowEngine {
    /// Verify one header, resolving its parent from the store
    pub fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        if self.pow_mode() == PowMode::FullFake {
            return Ok(());
        }
        // known headers and genesis are accepted as-is
        if header.number == 0 || chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }
        let parent = chain
            .get_header(&header.parent_hash, header.number - 1)
            .ok_or(ConsensusError::UnknownAncestor)?;
        self.verify_header_against(chain, header, &parent, false, seal)
    }

    /// Run every rule for `header` on top of an already resolved `parent`
    pub(crate) fn verify_header_against(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        parent: &Header,
        uncle: bool,
        seal: bool,
    ) -> ConsensusResult<()> {
        let config = chain.config();
        check_header_fields(config, header, parent, uncle, self.now())?;
        if seal {
            self.verify_seal(chain, header)?;
        }
        self.fork_rules.verify_header_extra(config, header, uncle)?;
        Ok(())
    }
}

/// Rules 1-7 against an explicit `now` (unix seconds)
pub fn check_header_fields(
    config: &ChainConfig,
    header: &Header,
    parent: &Header,
    uncle: bool,
    now: u64,
) -> ConsensusResult<()> {
    let p = &config.params;

    if header.extra.len() as u64 > p.maximum_extra_data_size {
        return Err(ConsensusError::ExtraDataTooLong {
            len: header.extra.len(),
            max: p.maximum_extra_data_size,
        });
    }

    if uncle {
        if header.time > *MAX_UINT256 {
            return Err(ConsensusError::TimestampTooLarge);
        }
    } else if header.time > BigUint::from(now.saturating_add(p.allowed_future_block_secs)) {
        return Err(ConsensusError::FutureBlock);
    }
    if header.time <= parent.time {
        return Err(ConsensusError::TimestampNotIncreasing);
    }

    if !header.is_super_header() {
        let want = calc_difficulty(config, &header.version, header.time_secs(), parent);
        if want != header.difficulty {
            return Err(ConsensusError::DifficultyMismatch {
                have: header.difficulty.clone(),
                want,
            });
        }
    }

    if header.gas_limit > MAX_GAS_LIMIT {
        return Err(ConsensusError::GasLimitOverflow {
            have: header.gas_limit,
            max: MAX_GAS_LIMIT,
        });
    }
    if header.gas_used > header.gas_limit {
        return Err(ConsensusError::GasUsedExceedsLimit {
            used: header.gas_used,
            limit: header.gas_limit,
        });
    }

    let drift = parent.gas_limit.abs_diff(header.gas_limit);
    let bound = parent.gas_limit / p.gas_limit_bound_divisor;
    if drift >= bound || header.gas_limit < p.min_gas_limit {
        return Err(ConsensusError::GasLimitOutOfBounds {
            have: header.gas_limit,
            parent: parent.gas_limit,
            bound,
        });
    }

    let want = parent.number.saturating_add(1);
    if header.number != want {
        return Err(ConsensusError::InvalidBlockNumber {
            have: header.number,
            want,
        });
    }
    Ok(())
}
