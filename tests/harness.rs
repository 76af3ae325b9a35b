#![allow(dead_code)]

use num_bigint::BigUint;
use std::sync::Arc;

use vision_consensus::chain::MemoryChain;
use vision_consensus::consensus_pow::calc_difficulty;
use vision_consensus::role::{Role, TopologyGraph};
use vision_consensus::{Address, Block, ChainConfig, Header};

pub const MINER: Address = [0x11; 20];
pub const UNCLE_MINER: Address = [0x22; 20];
pub const FAR_MINER: Address = [0x33; 20];
pub const GENESIS_TIME: u64 = 1_600_000_000;
pub const GAS_LIMIT: u64 = 8_000_000;

pub fn genesis() -> Header {
    Header {
        coinbase: MINER,
        time: BigUint::from(GENESIS_TIME),
        difficulty: BigUint::from(1_000_000u32),
        gas_limit: GAS_LIMIT,
        ..Default::default()
    }
}

/// Valid child of `parent`, `dt` seconds later, distinguished by `tag`
pub fn child_of(config: &ChainConfig, parent: &Header, dt: u64, tag: u8) -> Header {
    let mut h = Header {
        parent_hash: parent.hash(),
        coinbase: MINER,
        number: parent.number + 1,
        time: &parent.time + dt,
        gas_limit: parent.gas_limit,
        extra: vec![tag],
        ..Default::default()
    };
    h.difficulty = calc_difficulty(config, &h.version, h.time_secs(), parent);
    h
}

/// `n` valid headers chained on `parent`
pub fn build_headers(config: &ChainConfig, parent: &Header, n: usize) -> Vec<Header> {
    let mut out: Vec<Header> = Vec::with_capacity(n);
    for _ in 0..n {
        let prev = out.last().unwrap_or(parent);
        let next = child_of(config, prev, 10, 0);
        out.push(next);
    }
    out
}

/// In-memory chain seeded with a genesis block and the test accounts as elected miners
pub struct ChainBuilder {
    pub config: ChainConfig,
    pub chain: Arc<MemoryChain>,
    pub genesis: Block,
}

impl ChainBuilder {
    pub fn new(config: ChainConfig) -> Self {
        let chain = Arc::new(MemoryChain::new(config.clone()));
        chain.set_default_graph(
            TopologyGraph::new(0)
                .with_role(MINER, Role::Miner)
                .with_role(UNCLE_MINER, Role::Miner)
                .with_role(FAR_MINER, Role::Miner),
        );
        let genesis = Block::new(genesis(), vec![]);
        chain.insert_block(genesis.clone());
        Self {
            config,
            chain,
            genesis,
        }
    }

    /// Build (but do not store) a child block of `parent`
    pub fn child(&self, parent: &Block, tag: u8, uncles: Vec<Header>) -> Block {
        Block::new(child_of(&self.config, parent.header(), 10, tag), uncles)
    }

    /// Build and store a child block of `parent`
    pub fn extend(&self, parent: &Block, tag: u8, uncles: Vec<Header>) -> Block {
        let block = self.child(parent, tag, uncles);
        self.chain.insert_block(block.clone());
        block
    }

    /// Store `n` blocks on top of `parent`, returning them in order
    pub fn extend_n(&self, parent: &Block, n: usize) -> Vec<Block> {
        let mut out: Vec<Block> = Vec::with_capacity(n);
        for _ in 0..n {
            let prev = out.last().unwrap_or(parent).clone();
            out.push(self.extend(&prev, 0, vec![]));
        }
        out
    }
}
