//! Nonce search
//!
//! Worker threads claim nonce batches from a shared counter (seeded randomly
//! so concurrent sealers do not overlap) until one finds a result under the
//! difficulty target, the caller raises `stop`, or another worker wins.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use parking_lot::Mutex;

use crate::consensus_pow::PowEngine;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::pow::{meets_target, target_for};
use crate::types::{Hash, Header};

/// Nonces claimed per batch
const DEFAULT_BATCH_SIZE: u64 = 256;

pub struct Sealer {
    engine: PowEngine,
    threads: usize,
    batch_size: u64,
}

impl Sealer {
    pub fn new(engine: PowEngine) -> Self {
        Self {
            engine,
            threads: num_cpus::get().max(1),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Search for a seal; `Ok(None)` when stopped before one was found
    ///
    /// Fake modes return the header unchanged since any seal is accepted.
    pub fn seal(&self, header: &Header, stop: &AtomicBool) -> ConsensusResult<Option<Header>> {
        if self.engine.pow_mode().is_fake() {
            return Ok(Some(header.clone()));
        }
        let target = target_for(&header.difficulty).ok_or(ConsensusError::InvalidDifficulty)?;

        let seed = header.hash_no_nonce();
        let hasher = self.engine.hasher();
        let counter = AtomicU64::new(rand::random::<u64>());
        let winner = AtomicBool::new(false);
        let found: Mutex<Option<(u64, Hash)>> = Mutex::new(None);

        thread::scope(|scope| {
            for worker in 0..self.threads {
                let (target, seed, counter, winner, found) = (&target, &seed, &counter, &winner, &found);
                scope.spawn(move || {
                    while !winner.load(Ordering::Relaxed) && !stop.load(Ordering::Relaxed) {
                        let start = counter.fetch_add(self.batch_size, Ordering::Relaxed);
                        for i in 0..self.batch_size {
                            let nonce = start.wrapping_add(i);
                            let (digest, result) = hasher.compute(seed, nonce, header.number);
                            if !meets_target(&result, target) {
                                continue;
                            }
                            // first winner records the seal
                            if !winner.swap(true, Ordering::SeqCst) {
                                *found.lock() = Some((nonce, digest));
                                tracing::info!(
                                    worker,
                                    number = header.number,
                                    nonce,
                                    "[SEALER] solution found"
                                );
                            }
                            return;
                        }
                    }
                });
            }
        });

        Ok(found.into_inner().map(|(nonce, digest)| {
            let mut sealed = header.clone();
            sealed.nonce = nonce;
            sealed.mix_digest = digest;
            sealed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::consensus_pow::seal::verify_pow;
    use num_bigint::BigUint;

    #[test]
    fn test_sealed_header_passes_pow() {
        let engine = PowEngine::new(EngineConfig::test());
        let sealer = Sealer::new(engine.clone()).with_threads(2);
        let header = Header {
            number: 12,
            difficulty: BigUint::from(64u32),
            ..Default::default()
        };
        let stop = AtomicBool::new(false);
        let sealed = sealer.seal(&header, &stop).unwrap().unwrap();

        assert_eq!(sealed.hash_no_nonce(), header.hash_no_nonce());
        assert!(verify_pow(engine.hasher().as_ref(), &sealed).is_ok());
    }

    #[test]
    fn test_stop_flag() {
        let engine = PowEngine::new(EngineConfig::test());
        let sealer = Sealer::new(engine).with_threads(1);
        // unreachable target
        let header = Header {
            difficulty: &*crate::pow::MAX_UINT256 + 1u32,
            ..Default::default()
        };
        let stop = AtomicBool::new(true);
        assert_eq!(sealer.seal(&header, &stop), Ok(None));
    }

    #[test]
    fn test_zero_difficulty_rejected() {
        let sealer = Sealer::new(PowEngine::new(EngineConfig::test()));
        let stop = AtomicBool::new(false);
        assert_eq!(
            sealer.seal(&Header::default(), &stop),
            Err(ConsensusError::InvalidDifficulty)
        );
    }

    #[test]
    fn test_fake_mode_returns_header() {
        let sealer = Sealer::new(PowEngine::new(EngineConfig::fake()));
        let stop = AtomicBool::new(false);
        let header = Header::default();
        assert_eq!(sealer.seal(&header, &stop), Ok(Some(header)));
    }
}
