//! Uncle validation
//!
//! Collects the last `UNCLE_GENERATIONS` ancestors and every uncle they
//! already included, then checks each uncle of the block in order: not
//! included before, not an ancestor, a child of a recent ancestor other than
//! the block's own parent, and a valid header (seal included).

use std::collections::{HashMap, HashSet};

use crate::chain::ChainReader;
use crate::config::PowMode;
use crate::consensus_pow::PowEngine;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::types::{Block, Hash, Header};

/// How far back an uncle's parent may sit
pub const UNCLE_GENERATIONS: usize = 7;

impl PowEngine {
    pub fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        if self.pow_mode() == PowMode::FullFake {
            return Ok(());
        }

        let max = chain.config().params.max_uncles;
        let count = block.uncles().len();
        if count > max {
            return Err(ConsensusError::TooManyUncles { count, max });
        }
        if count == 0 {
            return Ok(());
        }

        let mut included: HashSet<Hash> = HashSet::new();
        let mut ancestors: HashMap<Hash, Header> = HashMap::new();

        let mut parent = block.parent_hash();
        let mut number = block.number().checked_sub(1);
        for _ in 0..UNCLE_GENERATIONS {
            let Some(n) = number else { break };
            let Some(ancestor) = chain.get_block(&parent, n) else {
                break;
            };
            included.extend(ancestor.uncles().iter().map(Header::hash));
            parent = ancestor.parent_hash();
            number = n.checked_sub(1);
            ancestors.insert(ancestor.hash(), ancestor.header().clone());
        }
        let block_hash = block.hash();
        ancestors.insert(block_hash, block.header().clone());
        included.insert(block_hash);

        for uncle in block.uncles() {
            let hash = uncle.hash();
            if !included.insert(hash) {
                return Err(ConsensusError::DuplicateUncle);
            }
            if ancestors.contains_key(&hash) {
                return Err(ConsensusError::UncleIsAncestor);
            }
            let uncle_parent = match ancestors.get(&uncle.parent_hash) {
                Some(p) if uncle.parent_hash != block.parent_hash() => p,
                _ => return Err(ConsensusError::DanglingUncle),
            };
            self.verify_header_against(chain, uncle, uncle_parent, true, true)?;
        }
        Ok(())
    }
}
