//! External collaborator interfaces
//!
//! The engine never owns chain data. Header/block lookups, role queries,
//! balance mutation and hard-fork extra checks all come in through these
//! traits so block import, mining and tests can plug their own backends in.

pub mod forks;
pub mod memory;

use num_bigint::BigUint;

use crate::config::ChainConfig;
use crate::errors::{ForkRuleError, LedgerError, TopologyError};
use crate::role::TopologyGraph;
use crate::types::{Address, Block, Hash, Header};

pub use forks::StandardForkRules;
pub use memory::{MemoryChain, MemoryLedger};

/// Currency credited with mining rewards
pub const MAIN_CURRENCY: &str = "MAIN";

/// Role lookups resolved at a parent block
pub trait TopologyReader {
    /// Topology graph in effect after block `hash`
    fn graph_by_hash(&self, hash: &Hash) -> Result<TopologyGraph, TopologyError>;

    /// Accounts allowed to mine regardless of the elected topology
    fn inner_miner_accounts(&self, hash: &Hash) -> Result<Vec<Address>, TopologyError>;
}

/// Read access to the header/block store
pub trait ChainReader: TopologyReader + Send + Sync {
    fn config(&self) -> &ChainConfig;

    /// Header by hash, only if it sits at `number`
    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header>;

    fn get_header_by_hash(&self, hash: &Hash) -> Option<Header>;

    /// Block by hash, only if it sits at `number`
    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block>;
}

/// The only mutation surface reward accumulation and finalization use
pub trait StateLedger {
    fn add_balance(
        &mut self,
        currency: &str,
        account: &Address,
        amount: &BigUint,
    ) -> Result<(), LedgerError>;

    /// State root after pending mutations; `delete_empty` drops zero balances
    fn intermediate_root(&mut self, delete_empty: bool) -> Hash;
}

/// Hard-fork specific header checks run after all engine rules pass
pub trait ForkRules: Send + Sync {
    fn verify_header_extra(
        &self,
        config: &ChainConfig,
        header: &Header,
        uncle: bool,
    ) -> Result<(), ForkRuleError>;
}
