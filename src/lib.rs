//! Vision proof-of-work consensus engine
//!
//! Header, seal and uncle validation, difficulty adjustment, reward
//! accumulation and block finalization for a PoW chain. Chain storage,
//! state, role topology and the hash primitive are reached through the
//! traits in [`chain`] and [`pow`].

pub mod chain;
pub mod config;
pub mod consensus_pow;
pub mod errors;
pub mod pow;
pub mod role;
pub mod types;
pub mod version;

pub use chain::{ChainReader, ForkRules, StateLedger, TopologyReader};
pub use config::{ChainConfig, EngineConfig, PowMode, ProtocolParams};
pub use consensus_pow::{AbortHandle, PowEngine, Sealer, VerifyResults};
pub use errors::{ConsensusError, ConsensusResult};
pub use types::{Address, Block, Hash, Header};
pub use version::ProtocolVersion;
