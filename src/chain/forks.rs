//! Standard hard-fork header rules
//!
//! - DAO window: for `DAO_FORK_EXTRA_RANGE` blocks from the DAO fork block,
//!   pro-fork nodes require the marker in extra-data and anti-fork nodes
//!   reject it.
//! - EIP150 pin: the header at the EIP150 block must hash to the configured
//!   value (uncles are exempt).

use crate::chain::ForkRules;
use crate::config::ChainConfig;
use crate::errors::ForkRuleError;
use crate::types::Header;

/// Extra-data marker of DAO hard-fork blocks
pub const DAO_FORK_BLOCK_EXTRA: &[u8] = b"dao-hard-fork";

/// Number of blocks from the DAO fork block that must carry the marker
pub const DAO_FORK_EXTRA_RANGE: u64 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardForkRules;

impl StandardForkRules {
    pub fn verify_dao_extra(config: &ChainConfig, header: &Header) -> Result<(), ForkRuleError> {
        let Some(fork_block) = config.dao_fork_block else {
            return Ok(());
        };
        let limit = fork_block.saturating_add(DAO_FORK_EXTRA_RANGE);
        if header.number < fork_block || header.number >= limit {
            return Ok(());
        }
        let marked = header.extra == DAO_FORK_BLOCK_EXTRA;
        if config.dao_fork_support && !marked {
            return Err(ForkRuleError::BadProDaoExtra);
        }
        if !config.dao_fork_support && marked {
            return Err(ForkRuleError::BadNoDaoExtra);
        }
        Ok(())
    }

    pub fn verify_fork_hashes(
        config: &ChainConfig,
        header: &Header,
        uncle: bool,
    ) -> Result<(), ForkRuleError> {
        if uncle {
            return Ok(());
        }
        if config.eip150_block != Some(header.number) {
            return Ok(());
        }
        if let Some(want) = config.eip150_hash() {
            let have = header.hash();
            if have != want {
                return Err(ForkRuleError::ForkHashMismatch {
                    number: header.number,
                    have: hex::encode(have),
                    want: hex::encode(want),
                });
            }
        }
        Ok(())
    }
}

impl ForkRules for StandardForkRules {
    fn verify_header_extra(
        &self,
        config: &ChainConfig,
        header: &Header,
        uncle: bool,
    ) -> Result<(), ForkRuleError> {
        Self::verify_dao_extra(config, header)?;
        Self::verify_fork_hashes(config, header, uncle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dao_config(support: bool) -> ChainConfig {
        ChainConfig {
            dao_fork_block: Some(100),
            dao_fork_support: support,
            ..ChainConfig::default()
        }
    }

    fn header_at(number: u64, extra: &[u8]) -> Header {
        Header {
            number,
            extra: extra.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pro_fork_requires_marker_in_window() {
        let rules = StandardForkRules;
        let config = dao_config(true);

        assert_eq!(
            rules.verify_header_extra(&config, &header_at(100, b""), false),
            Err(ForkRuleError::BadProDaoExtra)
        );
        assert!(rules
            .verify_header_extra(&config, &header_at(109, DAO_FORK_BLOCK_EXTRA), false)
            .is_ok());
        // outside the window anything goes
        assert!(rules.verify_header_extra(&config, &header_at(99, b""), false).is_ok());
        assert!(rules.verify_header_extra(&config, &header_at(110, b""), false).is_ok());
    }

    #[test]
    fn test_no_fork_rejects_marker() {
        let rules = StandardForkRules;
        let config = dao_config(false);
        assert_eq!(
            rules.verify_header_extra(&config, &header_at(105, DAO_FORK_BLOCK_EXTRA), false),
            Err(ForkRuleError::BadNoDaoExtra)
        );
        assert!(rules.verify_header_extra(&config, &header_at(105, b"x"), false).is_ok());
    }

    #[test]
    fn test_eip150_hash_pin() {
        let pinned = header_at(5, b"pinned");
        let config = ChainConfig {
            eip150_block: Some(5),
            eip150_hash: Some(hex::encode(pinned.hash())),
            ..ChainConfig::default()
        };
        let rules = StandardForkRules;

        assert!(rules.verify_header_extra(&config, &pinned, false).is_ok());

        let other = header_at(5, b"other");
        assert!(matches!(
            rules.verify_header_extra(&config, &other, false),
            Err(ForkRuleError::ForkHashMismatch { number: 5, .. })
        ));
        // uncles are exempt from the pin
        assert!(rules.verify_header_extra(&config, &other, true).is_ok());
    }
}
