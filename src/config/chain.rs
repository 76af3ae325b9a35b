//! Chain configuration
//!
//! Fork activation boundaries and the numeric policy constants the engine
//! validates against. Loadable from TOML; every field has a default so a
//! partial file only overrides what it names.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;
use crate::types::Hash;
use crate::version::ProtocolVersion;

/// Numeric consensus policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// Maximum size extra data may be after genesis
    pub maximum_extra_data_size: u64,
    /// Divisor bounding per-block difficulty change
    pub difficulty_bound_divisor: u64,
    /// Floor for any computed difficulty (before the ice-age term)
    pub minimum_difficulty: u64,
    /// Block time (seconds) below which difficulty rises
    pub duration_limit: u64,
    /// Byzantium duration limit for headers at or above `gamma_version`
    pub gamma_duration_limit: u64,
    /// Version tag that switches to `gamma_duration_limit`
    pub gamma_version: ProtocolVersion,
    /// Divisor bounding per-block gas limit drift
    pub gas_limit_bound_divisor: u64,
    /// Gas limit floor
    pub min_gas_limit: u64,
    /// Block reward before Byzantium (wei)
    pub frontier_block_reward: u128,
    /// Block reward from Byzantium on (wei)
    pub byzantium_block_reward: u128,
    /// Maximum uncles in a single block
    pub max_uncles: usize,
    /// Max seconds a header may be ahead of local time
    pub allowed_future_block_secs: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            maximum_extra_data_size: 32,
            difficulty_bound_divisor: 2048,
            minimum_difficulty: 131_072,
            duration_limit: 13,
            gamma_duration_limit: 20,
            gamma_version: ProtocolVersion::gamma(),
            gas_limit_bound_divisor: 1024,
            min_gas_limit: 5000,
            frontier_block_reward: 5_000_000_000_000_000_000,
            byzantium_block_reward: 3_000_000_000_000_000_000,
            max_uncles: 2,
            allowed_future_block_secs: 15,
        }
    }
}

/// Fork schedule plus policy constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Homestead switch block (None = never)
    pub homestead_block: Option<u64>,
    /// DAO hard-fork switch block (None = no fork)
    pub dao_fork_block: Option<u64>,
    /// Whether the node supports the DAO hard-fork
    pub dao_fork_support: bool,
    /// EIP150 switch block and the canonical hash pinned there
    pub eip150_block: Option<u64>,
    pub eip150_hash: Option<String>,
    pub eip155_block: Option<u64>,
    pub eip158_block: Option<u64>,
    /// Byzantium switch block (None = never)
    pub byzantium_block: Option<u64>,
    pub params: ProtocolParams,
}

impl Default for ChainConfig {
    /// All forks active from genesis
    fn default() -> Self {
        Self {
            chain_id: 1,
            homestead_block: Some(0),
            dao_fork_block: None,
            dao_fork_support: false,
            eip150_block: Some(0),
            eip150_hash: None,
            eip155_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            params: ProtocolParams::default(),
        }
    }
}

fn is_forked(fork: Option<u64>, number: u64) -> bool {
    fork.map_or(false, |at| number >= at)
}

impl ChainConfig {
    /// Chain that never leaves Frontier rules
    pub fn frontier() -> Self {
        Self {
            homestead_block: None,
            eip150_block: None,
            eip155_block: None,
            eip158_block: None,
            byzantium_block: None,
            ..Self::default()
        }
    }

    pub fn is_homestead(&self, number: u64) -> bool {
        is_forked(self.homestead_block, number)
    }

    pub fn is_dao_fork(&self, number: u64) -> bool {
        is_forked(self.dao_fork_block, number)
    }

    pub fn is_eip150(&self, number: u64) -> bool {
        is_forked(self.eip150_block, number)
    }

    pub fn is_eip155(&self, number: u64) -> bool {
        is_forked(self.eip155_block, number)
    }

    pub fn is_eip158(&self, number: u64) -> bool {
        is_forked(self.eip158_block, number)
    }

    pub fn is_byzantium(&self, number: u64) -> bool {
        is_forked(self.byzantium_block, number)
    }

    /// Pinned EIP150 hash, if configured and well-formed
    pub fn eip150_hash(&self) -> Option<Hash> {
        let raw = self.eip150_hash.as_deref()?;
        let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw)).ok()?;
        bytes.try_into().ok()
    }

    /// Static block reward in effect at `number`
    pub fn block_reward(&self, number: u64) -> BigUint {
        if self.is_byzantium(number) {
            BigUint::from(self.params.byzantium_block_reward)
        } else {
            BigUint::from(self.params.frontier_block_reward)
        }
    }

    /// Parse from a TOML document and validate
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ChainConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration (non-zero divisors, ordered forks)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.params;
        if p.difficulty_bound_divisor == 0 {
            return Err(ConfigError::Invalid(
                "difficulty_bound_divisor must be > 0".into(),
            ));
        }
        if p.gas_limit_bound_divisor == 0 {
            return Err(ConfigError::Invalid(
                "gas_limit_bound_divisor must be > 0".into(),
            ));
        }
        if p.duration_limit == 0 || p.gamma_duration_limit == 0 {
            return Err(ConfigError::Invalid("duration limits must be > 0".into()));
        }
        if let (Some(homestead), Some(byzantium)) = (self.homestead_block, self.byzantium_block) {
            if byzantium < homestead {
                return Err(ConfigError::Invalid(format!(
                    "byzantium_block {} precedes homestead_block {}",
                    byzantium, homestead
                )));
            }
        }
        if self.eip150_hash.is_some() && self.eip150_hash().is_none() {
            return Err(ConfigError::Invalid(
                "eip150_hash must be 32 bytes of hex".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();
        assert!(config.is_homestead(0));
        assert!(config.is_byzantium(0));
        assert!(!config.is_dao_fork(1_000_000));
        assert_eq!(config.params.difficulty_bound_divisor, 2048);
        assert_eq!(config.params.minimum_difficulty, 131_072);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fork_boundaries() {
        let config = ChainConfig {
            homestead_block: Some(100),
            byzantium_block: Some(200),
            ..ChainConfig::frontier()
        };
        assert!(!config.is_homestead(99));
        assert!(config.is_homestead(100));
        assert!(!config.is_byzantium(199));
        assert!(config.is_byzantium(200));
        assert_eq!(
            config.block_reward(199),
            BigUint::from(5_000_000_000_000_000_000u128)
        );
        assert_eq!(
            config.block_reward(200),
            BigUint::from(3_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_partial_toml_overrides() {
        let raw = r#"
            chain_id = 7
            byzantium_block = 500

            [params]
            minimum_difficulty = 1000
        "#;
        let config = ChainConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.chain_id, 7);
        assert_eq!(config.byzantium_block, Some(500));
        assert_eq!(config.params.minimum_difficulty, 1000);
        // untouched fields keep their defaults
        assert_eq!(config.params.difficulty_bound_divisor, 2048);
    }

    #[test]
    fn test_validation() {
        let config = ChainConfig {
            homestead_block: Some(10),
            byzantium_block: Some(5),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ChainConfig::default();
        config.params.gas_limit_bound_divisor = 0;
        assert!(config.validate().is_err());

        let config = ChainConfig {
            eip150_hash: Some("0x1234".into()),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "homestead_block = 3").unwrap();
        writeln!(f, "byzantium_block = 5").unwrap();
        writeln!(f, "eip150_hash = \"0x{}\"", "ab".repeat(32)).unwrap();
        drop(f);

        let config = ChainConfig::load(&path).unwrap();
        assert_eq!(config.homestead_block, Some(3));
        assert_eq!(config.byzantium_block, Some(5));
        assert_eq!(config.eip150_hash(), Some([0xab; 32]));
    }

    #[test]
    fn test_load_rejects_misordered_forks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.toml");
        // byzantium keeps its default of 0, ahead of homestead
        fs::write(&path, "homestead_block = 3\n").unwrap();
        assert!(matches!(
            ChainConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
