//! Difficulty adjustment
//!
//! Three formulas selected by the fork active at `parent.number + 1`:
//! - Frontier: +/- parent/2048 depending on whether the block came in under
//!   the duration limit
//! - Homestead: parent/2048 scaled by `max(1 - dt/10, -99)`
//! - Byzantium: parent/2048 scaled by `max(base - dt/limit, -99)` where base
//!   is 2 if the parent has uncles, and the ice-age bomb is delayed by
//!   ~3M blocks
//!
//! All arithmetic is arbitrary precision. Signed intermediates use floor
//! division so a parent timestamp ahead of `time` rounds toward -inf.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ChainConfig;
use crate::types::Header;
use crate::version::ProtocolVersion;

/// Blocks per ice-age period
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// Byzantium bomb delay (parent number offset)
pub const BYZANTIUM_BOMB_DELAY: u64 = 2_999_999;

/// Homestead adjustment step in seconds
const HOMESTEAD_STEP_SECS: u64 = 10;

/// Lower clamp on the adjustment multiplier
const MIN_ADJUST_FACTOR: i64 = -99;

/// Which formula applies to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyRule {
    Frontier,
    Homestead,
    Byzantium,
}

impl DifficultyRule {
    pub fn for_block(config: &ChainConfig, number: u64) -> Self {
        if config.is_byzantium(number) {
            DifficultyRule::Byzantium
        } else if config.is_homestead(number) {
            DifficultyRule::Homestead
        } else {
            DifficultyRule::Frontier
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyRule::Frontier => "frontier",
            DifficultyRule::Homestead => "homestead",
            DifficultyRule::Byzantium => "byzantium",
        }
    }
}

/// Difficulty a child of `parent` created at `time` must carry
pub fn calc_difficulty(
    config: &ChainConfig,
    version: &ProtocolVersion,
    time: u64,
    parent: &Header,
) -> BigUint {
    let next = parent.number.saturating_add(1);
    let rule = DifficultyRule::for_block(config, next);
    let diff = match rule {
        DifficultyRule::Byzantium => calc_difficulty_byzantium(config, version, time, parent),
        DifficultyRule::Homestead => calc_difficulty_homestead(config, time, parent),
        DifficultyRule::Frontier => calc_difficulty_frontier(config, time, parent),
    };
    tracing::debug!(
        parent = parent.number,
        rule = rule.as_str(),
        difficulty = %diff,
        "[DIFFICULTY] computed"
    );
    diff
}

/// `time - parent.time` as a signed big integer
fn time_delta(time: u64, parent: &Header) -> BigInt {
    BigInt::from(time) - BigInt::from_biguint(Sign::Plus, parent.time.clone())
}

/// `max(x, MinimumDifficulty)` back in unsigned form
fn clamp_min(x: BigInt, minimum: u64) -> BigUint {
    let minimum = BigInt::from(minimum);
    let x = if x < minimum { minimum } else { x };
    x.to_biguint().unwrap_or_default()
}

/// Ice-age term `2^(period - 2)` for `period > 1`
fn bomb(period: u64) -> Option<BigUint> {
    (period > 1).then(|| BigUint::one() << (period - 2))
}

/// Shared core of Homestead and Byzantium:
/// `max(parent + step * max(base - dt / limit, -99), minimum)`
fn adjusted(parent: &Header, base: i64, delta: BigInt, limit: u64, step: BigUint, minimum: u64) -> BigUint {
    let mut x = BigInt::from(base) - delta.div_floor(&BigInt::from(limit));
    let floor = BigInt::from(MIN_ADJUST_FACTOR);
    if x < floor {
        x = floor;
    }
    let parent_diff = BigInt::from_biguint(Sign::Plus, parent.difficulty.clone());
    let step = BigInt::from_biguint(Sign::Plus, step);
    clamp_min(parent_diff + step * x, minimum)
}

pub fn calc_difficulty_byzantium(
    config: &ChainConfig,
    version: &ProtocolVersion,
    time: u64,
    parent: &Header,
) -> BigUint {
    let p = &config.params;
    let limit = if version.is_at_least(&p.gamma_version) {
        p.gamma_duration_limit
    } else {
        p.duration_limit
    };
    let base = if parent.has_uncles() { 2 } else { 1 };

    let mut step = &parent.difficulty / p.difficulty_bound_divisor;
    if step.is_zero() {
        step = BigUint::one();
    }

    let mut diff = adjusted(parent, base, time_delta(time, parent), limit, step, p.minimum_difficulty);

    // parent is one below the block being computed
    let fake_number = parent.number.saturating_sub(BYZANTIUM_BOMB_DELAY);
    if let Some(term) = bomb(fake_number / EXP_DIFF_PERIOD) {
        diff += term;
    }
    diff
}

pub fn calc_difficulty_homestead(config: &ChainConfig, time: u64, parent: &Header) -> BigUint {
    let p = &config.params;
    let step = &parent.difficulty / p.difficulty_bound_divisor;

    let mut diff = adjusted(
        parent,
        1,
        time_delta(time, parent),
        HOMESTEAD_STEP_SECS,
        step,
        p.minimum_difficulty,
    );

    if let Some(term) = bomb(parent.number.saturating_add(1) / EXP_DIFF_PERIOD) {
        diff += term;
    }
    diff
}

pub fn calc_difficulty_frontier(config: &ChainConfig, time: u64, parent: &Header) -> BigUint {
    let p = &config.params;
    let adjust = &parent.difficulty / p.difficulty_bound_divisor;

    let mut diff = if time_delta(time, parent) < BigInt::from(p.duration_limit) {
        &parent.difficulty + &adjust
    } else {
        &parent.difficulty - &adjust
    };
    let minimum = BigUint::from(p.minimum_difficulty);
    if diff < minimum {
        diff = minimum.clone();
    }

    if let Some(term) = bomb(parent.number.saturating_add(1) / EXP_DIFF_PERIOD) {
        diff += term;
        if diff < minimum {
            diff = minimum;
        }
    }
    diff
}

/// Get current unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
