//! Block assembly after execution
//!
//! `finalize` credits the mining rewards, commits the state root reported by
//! the ledger and wraps header plus uncles into a block ready for sealing.

use crate::chain::{ChainReader, StateLedger};
use crate::consensus_pow::rewards::accumulate_rewards;
use crate::consensus_pow::PowEngine;
use crate::errors::ConsensusResult;
use crate::types::{Block, Header};

impl PowEngine {
    pub fn finalize(
        &self,
        chain: &dyn ChainReader,
        mut header: Header,
        ledger: &mut dyn StateLedger,
        uncles: Vec<Header>,
    ) -> ConsensusResult<Block> {
        let config = chain.config();
        accumulate_rewards(config, ledger, &header, &uncles)?;
        header.state_root = ledger.intermediate_root(config.is_eip158(header.number));

        let block = Block::new(header, uncles);
        tracing::debug!(
            number = block.number(),
            uncles = block.uncles().len(),
            state_root = %hex::encode(block.header().state_root),
            "[BLOCK-BUILDER] finalized"
        );
        Ok(block)
    }
}
