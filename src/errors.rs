//! Domain-specific error types for the PoW consensus engine
//!
//! Every validation rule maps to exactly one `ConsensusError` variant so that
//! callers (block import, mining loop) can tell failures apart without string
//! matching. Collaborator failures are wrapped, never swallowed.

use num_bigint::BigUint;
use thiserror::Error;

/// Header, seal and uncle validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("extra-data too long: {len} > {max}")]
    ExtraDataTooLong { len: usize, max: u64 },

    #[error("timestamp too big")]
    TimestampTooLarge,

    #[error("block in the future")]
    FutureBlock,

    #[error("timestamp equals parent's")]
    TimestampNotIncreasing,

    #[error("invalid difficulty: have {have}, want {want}")]
    DifficultyMismatch { have: BigUint, want: BigUint },

    #[error("invalid gasLimit: have {have}, max {max}")]
    GasLimitOverflow { have: u64, max: u64 },

    #[error("invalid gasUsed: have {used}, gasLimit {limit}")]
    GasUsedExceedsLimit { used: u64, limit: u64 },

    #[error("invalid gas limit: have {have}, want {parent} += {bound}")]
    GasLimitOutOfBounds { have: u64, parent: u64, bound: u64 },

    #[error("invalid block number: have {have}, want {want}")]
    InvalidBlockNumber { have: u64, want: u64 },

    #[error("unknown ancestor")]
    UnknownAncestor,

    #[error("too many uncles: {count} > {max}")]
    TooManyUncles { count: usize, max: usize },

    #[error("duplicate uncle")]
    DuplicateUncle,

    #[error("uncle is ancestor")]
    UncleIsAncestor,

    #[error("uncle's parent is not ancestor")]
    DanglingUncle,

    #[error("non-positive difficulty")]
    InvalidDifficulty,

    #[error("invalid mix digest")]
    InvalidMixDigest,

    #[error("invalid proof-of-work")]
    InvalidPoW,

    #[error("invalid coinbase")]
    InvalidCoinbase,

    #[error("fork rule violated: {0}")]
    ForkRule(#[from] ForkRuleError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Hard-fork specific header checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForkRuleError {
    #[error("bad DAO pro-fork extra-data")]
    BadProDaoExtra,

    #[error("bad DAO no-fork extra-data")]
    BadNoDaoExtra,

    #[error("fork hash mismatch at block {number}: have {have}, want {want}")]
    ForkHashMismatch {
        number: u64,
        have: String,
        want: String,
    },
}

/// State ledger mutation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("ledger write failed: {0}")]
    WriteFailed(String),
}

/// Role/topology lookups (reported as `InvalidCoinbase` by the seal verifier)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("no topology graph for block {0}")]
    GraphNotFound(String),

    #[error("no inner miner list for block {0}")]
    InnerMinersNotFound(String),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
