//! In-memory chain store and ledger
//!
//! Used by the CLI and tests. Interior mutability lets a store be shared
//! behind an `Arc` with the batch verifier while still accepting inserts.

use num_bigint::BigUint;
use num_traits::Zero;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::chain::{ChainReader, StateLedger, TopologyReader};
use crate::config::ChainConfig;
use crate::errors::{ConfigError, LedgerError, TopologyError};
use crate::role::TopologyGraph;
use crate::types::{Address, Block, Hash, Header};

#[derive(Debug, Default)]
pub struct MemoryChain {
    config: ChainConfig,
    headers: RwLock<HashMap<Hash, Header>>,
    blocks: RwLock<HashMap<Hash, Block>>,
    graphs: RwLock<HashMap<Hash, TopologyGraph>>,
    default_graph: RwLock<Option<TopologyGraph>>,
    inner_miners: RwLock<Vec<Address>>,
}

impl MemoryChain {
    /// Store over `config` as given. The engine divides by the configured
    /// bound divisors, so `config` must pass `ChainConfig::validate`.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Store over a config that is validated first
    pub fn try_new(config: ChainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Accept `miners` as inner miners. Installs an empty default topology
    /// when none is set, since the inner-miner list is only consulted after
    /// the parent's topology resolves.
    pub fn with_inner_miners(self, miners: Vec<Address>) -> Self {
        {
            let mut graph = self.default_graph.write();
            if graph.is_none() {
                *graph = Some(TopologyGraph::new(0));
            }
        }
        self.set_inner_miners(miners);
        self
    }

    pub fn insert_header(&self, header: Header) {
        self.headers.write().insert(header.hash(), header);
    }

    /// Store a block and its header
    pub fn insert_block(&self, block: Block) {
        let hash = block.hash();
        self.headers.write().insert(hash, block.header().clone());
        self.blocks.write().insert(hash, block);
    }

    /// Topology in effect after block `hash`
    pub fn set_graph(&self, hash: Hash, graph: TopologyGraph) {
        self.graphs.write().insert(hash, graph);
    }

    /// Topology used for any block without its own graph
    pub fn set_default_graph(&self, graph: TopologyGraph) {
        *self.default_graph.write() = Some(graph);
    }

    pub fn set_inner_miners(&self, miners: Vec<Address>) {
        *self.inner_miners.write() = miners;
    }
}

impl TopologyReader for MemoryChain {
    fn graph_by_hash(&self, hash: &Hash) -> Result<TopologyGraph, TopologyError> {
        if let Some(graph) = self.graphs.read().get(hash) {
            return Ok(graph.clone());
        }
        self.default_graph
            .read()
            .clone()
            .ok_or_else(|| TopologyError::GraphNotFound(hex::encode(hash)))
    }

    fn inner_miner_accounts(&self, _hash: &Hash) -> Result<Vec<Address>, TopologyError> {
        Ok(self.inner_miners.read().clone())
    }
}

impl ChainReader for MemoryChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn get_header(&self, hash: &Hash, number: u64) -> Option<Header> {
        self.headers
            .read()
            .get(hash)
            .filter(|h| h.number == number)
            .cloned()
    }

    fn get_header_by_hash(&self, hash: &Hash) -> Option<Header> {
        self.headers.read().get(hash).cloned()
    }

    fn get_block(&self, hash: &Hash, number: u64) -> Option<Block> {
        self.blocks
            .read()
            .get(hash)
            .filter(|b| b.number() == number)
            .cloned()
    }
}

/// Balance map keyed by (currency, account)
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<(String, Address), BigUint>,
    /// Accepted currencies (None = any)
    currencies: Option<BTreeSet<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that rejects credits in any other currency
    pub fn with_currencies<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            balances: BTreeMap::new(),
            currencies: Some(currencies.into_iter().map(Into::into).collect()),
        }
    }

    pub fn balance(&self, currency: &str, account: &Address) -> BigUint {
        self.balances
            .get(&(currency.to_string(), *account))
            .cloned()
            .unwrap_or_default()
    }
}

impl StateLedger for MemoryLedger {
    fn add_balance(
        &mut self,
        currency: &str,
        account: &Address,
        amount: &BigUint,
    ) -> Result<(), LedgerError> {
        if let Some(allowed) = &self.currencies {
            if !allowed.contains(currency) {
                return Err(LedgerError::UnknownCurrency(currency.to_string()));
            }
        }
        *self
            .balances
            .entry((currency.to_string(), *account))
            .or_default() += amount;
        Ok(())
    }

    fn intermediate_root(&mut self, delete_empty: bool) -> Hash {
        if delete_empty {
            self.balances.retain(|_, bal| !bal.is_zero());
        }
        let mut hasher = blake3::Hasher::new();
        for ((currency, account), bal) in &self.balances {
            hasher.update(currency.as_bytes());
            hasher.update(account);
            hasher.update(&bal.to_bytes_be());
        }
        *hasher.finalize().as_bytes()
    }
}
