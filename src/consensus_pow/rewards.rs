//! Block and uncle rewards
//!
//! Each uncle's coinbase gets `(uncle.number + 8 - header.number) * R / 8`;
//! the block's coinbase gets `R` plus `R / 32` per included uncle.

use num_bigint::BigUint;

use crate::chain::{StateLedger, MAIN_CURRENCY};
use crate::config::ChainConfig;
use crate::errors::LedgerError;
use crate::types::Header;

/// Generations over which an uncle reward decays to zero
const UNCLE_REWARD_DEPTH: u64 = 8;

/// Share of the block reward paid per included uncle (as a divisor)
const UNCLE_INCLUSION_DIVISOR: u32 = 32;

/// Reward owed to the coinbase of `uncle` included in `header`
pub fn uncle_reward(block_reward: &BigUint, header: &Header, uncle: &Header) -> BigUint {
    let depth = uncle
        .number
        .saturating_add(UNCLE_REWARD_DEPTH)
        .saturating_sub(header.number);
    BigUint::from(depth) * block_reward / UNCLE_REWARD_DEPTH
}

/// Credit the miner and every uncle miner of `header`
pub fn accumulate_rewards(
    config: &ChainConfig,
    ledger: &mut dyn StateLedger,
    header: &Header,
    uncles: &[Header],
) -> Result<(), LedgerError> {
    let block_reward = config.block_reward(header.number);
    let inclusion = &block_reward / UNCLE_INCLUSION_DIVISOR;

    let mut reward = block_reward.clone();
    for uncle in uncles {
        let r = uncle_reward(&block_reward, header, uncle);
        ledger.add_balance(MAIN_CURRENCY, &uncle.coinbase, &r)?;
        reward += &inclusion;
    }
    tracing::debug!(
        number = header.number,
        uncles = uncles.len(),
        reward = %reward,
        "[REWARDS] crediting miner"
    );
    ledger.add_balance(MAIN_CURRENCY, &header.coinbase, &reward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryLedger;

    const MINER: [u8; 20] = [1u8; 20];
    const UNCLE_MINER: [u8; 20] = [2u8; 20];

    fn header(number: u64, coinbase: [u8; 20]) -> Header {
        Header {
            number,
            coinbase,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_uncles_pays_block_reward() {
        let config = ChainConfig::frontier();
        let mut ledger = MemoryLedger::new();
        accumulate_rewards(&config, &mut ledger, &header(10, MINER), &[]).unwrap();
        assert_eq!(
            ledger.balance(MAIN_CURRENCY, &MINER),
            BigUint::from(5_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_byzantium_uncle_reward() {
        let config = ChainConfig::default();
        let mut ledger = MemoryLedger::new();
        let uncle = header(99, UNCLE_MINER);
        accumulate_rewards(&config, &mut ledger, &header(100, MINER), &[uncle]).unwrap();

        let r = 3_000_000_000_000_000_000u128;
        assert_eq!(ledger.balance(MAIN_CURRENCY, &UNCLE_MINER), BigUint::from(7 * r / 8));
        assert_eq!(ledger.balance(MAIN_CURRENCY, &MINER), BigUint::from(r + r / 32));
    }

    #[test]
    fn test_stale_uncle_earns_nothing() {
        let r = BigUint::from(8u32);
        assert_eq!(uncle_reward(&r, &header(20, MINER), &header(10, UNCLE_MINER)), BigUint::default());
        assert_eq!(uncle_reward(&r, &header(20, MINER), &header(13, UNCLE_MINER)), BigUint::from(1u32));
    }

    #[test]
    fn test_ledger_error_propagates() {
        let config = ChainConfig::default();
        let mut ledger = MemoryLedger::with_currencies(["OTHER"]);
        let err = accumulate_rewards(&config, &mut ledger, &header(1, MINER), &[]).unwrap_err();
        assert_eq!(err, LedgerError::UnknownCurrency(MAIN_CURRENCY.into()));
    }
}
