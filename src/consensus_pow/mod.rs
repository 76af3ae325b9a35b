//! Proof-of-work consensus engine
//!
//! `PowEngine` is the operation surface the import and mining paths call:
//! header/uncle/seal verification, difficulty, `prepare` and `finalize`.
//! The operations live in the submodules as `impl PowEngine` blocks.

pub mod batch;
pub mod block_builder;
pub mod difficulty;
pub mod encoding;
pub mod header;
pub mod rewards;
pub mod seal;
pub mod sealer;
pub mod uncles;

use num_bigint::BigUint;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

use crate::chain::{ChainReader, ForkRules, StandardForkRules};
use crate::config::{EngineConfig, PowMode};
use crate::errors::{ConsensusError, ConsensusResult};
use crate::pow::{LightMix, MixParams, PowHasher};
use crate::types::{Address, Header};
use crate::version::ProtocolVersion;

pub use batch::{AbortHandle, VerifyResults};
pub use difficulty::{calc_difficulty, current_timestamp, DifficultyRule};
pub use header::check_header_fields;
pub use rewards::accumulate_rewards;
pub use sealer::Sealer;

/// Unix-seconds source used by the future-block check
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Process-wide engine that `new_shared` engines delegate seal checks to
static SHARED_ENGINE: Lazy<Arc<PowEngine>> =
    Lazy::new(|| Arc::new(PowEngine::new(EngineConfig::normal())));

#[derive(Clone)]
pub struct PowEngine {
    config: Arc<EngineConfig>,
    hasher: Arc<dyn PowHasher>,
    fork_rules: Arc<dyn ForkRules>,
    shared: Option<Arc<PowEngine>>,
    clock: Clock,
}

impl fmt::Debug for PowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowEngine")
            .field("config", &self.config)
            .field("shared", &self.shared.is_some())
            .finish_non_exhaustive()
    }
}

impl PowEngine {
    /// Engine with the LightMix primitive and standard fork rules
    pub fn new(config: EngineConfig) -> Self {
        let params = match config.pow_mode {
            PowMode::Test => MixParams::test(),
            _ => MixParams::normal(),
        };
        Self {
            config: Arc::new(config),
            hasher: Arc::new(LightMix::new(params)),
            fork_rules: Arc::new(StandardForkRules),
            shared: None,
            clock: Arc::new(current_timestamp),
        }
    }

    /// Normal-mode engine whose seal checks go through the process-wide engine
    pub fn new_shared() -> Self {
        Self::new(EngineConfig::normal()).with_shared(Arc::clone(&SHARED_ENGINE))
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn PowHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_fork_rules(mut self, rules: Arc<dyn ForkRules>) -> Self {
        self.fork_rules = rules;
        self
    }

    pub fn with_shared(mut self, shared: Arc<PowEngine>) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pow_mode(&self) -> PowMode {
        self.config.pow_mode
    }

    pub fn hasher(&self) -> &Arc<dyn PowHasher> {
        &self.hasher
    }

    pub(crate) fn now(&self) -> u64 {
        (self.clock)()
    }

    /// Proof-of-work author of a header
    pub fn author(&self, header: &Header) -> Address {
        header.coinbase
    }

    /// Difficulty a child of `parent` at `time` must carry
    pub fn calc_difficulty(
        &self,
        chain: &dyn ChainReader,
        version: &ProtocolVersion,
        time: u64,
        parent: &Header,
    ) -> BigUint {
        calc_difficulty(chain.config(), version, time, parent)
    }

    /// Fill in the header difficulty ahead of sealing
    pub fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()> {
        let parent = header
            .number
            .checked_sub(1)
            .and_then(|n| chain.get_header(&header.parent_hash, n))
            .ok_or(ConsensusError::UnknownAncestor)?;
        header.difficulty =
            self.calc_difficulty(chain, &header.version, header.time_secs(), &parent);
        Ok(())
    }
}
