//! Parallel batch header verification
//!
//! `min(num_cpus, n)` workers pull indices from a shared counter and report
//! `(index, result)` to a coordinator thread. The coordinator parks results
//! in per-index slots and flushes the contiguous completed prefix, so the
//! caller sees results strictly in input order. Aborting is cooperative:
//! no new index is picked up and the coordinator stops emitting, but a
//! verification already running is left to finish.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use crate::chain::ChainReader;
use crate::config::PowMode;
use crate::consensus_pow::PowEngine;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::types::Header;

/// Ordered per-header outcomes of `verify_headers`
pub type VerifyResults = Receiver<ConsensusResult<()>>;

/// Stops a running batch
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl PowEngine {
    /// Verify a batch of headers concurrently
    ///
    /// `seals[i]` selects seal verification for `headers[i]` (missing entries
    /// mean no seal check). Each header's result is independent of the others.
    pub fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, VerifyResults) {
        let abort = AbortHandle::default();
        let (results_tx, results_rx) = mpsc::channel();
        let n = headers.len();

        if self.pow_mode() == PowMode::FullFake || n == 0 {
            for _ in 0..n {
                let _ = results_tx.send(Ok(()));
            }
            return (abort, results_rx);
        }

        let workers = num_cpus::get().clamp(1, n);
        let headers: Arc<[Header]> = headers.into();
        let seals: Arc<[bool]> = seals.into();
        let next = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = mpsc::channel::<(usize, ConsensusResult<()>)>();

        for _ in 0..workers {
            let engine = self.clone();
            let chain = Arc::clone(&chain);
            let headers = Arc::clone(&headers);
            let seals = Arc::clone(&seals);
            let next = Arc::clone(&next);
            let abort = abort.clone();
            let done_tx = done_tx.clone();
            thread::spawn(move || loop {
                if abort.is_aborted() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= headers.len() {
                    break;
                }
                let seal = seals.get(index).copied().unwrap_or(false);
                let result = engine.verify_header_worker(chain.as_ref(), &headers, seal, index);
                if done_tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        // coordinator sees the channel close once every worker has exited
        drop(done_tx);

        let coordinator_abort = abort.clone();
        thread::spawn(move || {
            let span = tracing::info_span!("verify_headers", count = n, workers);
            let _enter = span.enter();

            let abort = coordinator_abort;
            let mut slots: Vec<Option<ConsensusResult<()>>> = (0..n).map(|_| None).collect();
            let mut out = 0;

            while out < n {
                let Ok((index, result)) = done_rx.recv() else {
                    break;
                };
                if abort.is_aborted() {
                    tracing::debug!(delivered = out, "[BATCH] aborted");
                    return;
                }
                slots[index] = Some(result);
                while let Some(result) = slots.get_mut(out).and_then(Option::take) {
                    if results_tx.send(result).is_err() {
                        // receiver gone: stop the workers too
                        abort.abort();
                        return;
                    }
                    out += 1;
                }
            }
            tracing::debug!(delivered = out, "[BATCH] done");
        });

        (abort, results_rx)
    }

    /// Verify `headers[index]`, chaining onto `headers[index - 1]` when it is the parent
    fn verify_header_worker(
        &self,
        chain: &dyn ChainReader,
        headers: &[Header],
        seal: bool,
        index: usize,
    ) -> ConsensusResult<()> {
        let header = &headers[index];
        if header.number == 0 || chain.get_header(&header.hash(), header.number).is_some() {
            return Ok(());
        }

        let parent = match index.checked_sub(1).map(|i| &headers[i]) {
            Some(prev) if prev.hash() == header.parent_hash => Cow::Borrowed(prev),
            _ => Cow::Owned(
                chain
                    .get_header(&header.parent_hash, header.number - 1)
                    .ok_or(ConsensusError::UnknownAncestor)?,
            ),
        };
        self.verify_header_against(chain, header, &parent, false, seal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;
    use crate::config::{ChainConfig, EngineConfig};
    use crate::consensus_pow::difficulty::calc_difficulty;
    use num_bigint::BigUint;

    fn genesis() -> Header {
        Header {
            time: BigUint::from(1_000u32),
            difficulty: BigUint::from(200_000u32),
            gas_limit: 8_000_000,
            ..Default::default()
        }
    }

    fn build_chain(config: &ChainConfig, parent: &Header, n: usize) -> Vec<Header> {
        let mut out = Vec::with_capacity(n);
        let mut parent = parent.clone();
        for _ in 0..n {
            let mut h = Header {
                parent_hash: parent.hash(),
                number: parent.number + 1,
                time: &parent.time + 10u32,
                gas_limit: parent.gas_limit,
                ..Default::default()
            };
            h.difficulty = calc_difficulty(config, &h.version, h.time_secs(), &parent);
            out.push(h.clone());
            parent = h;
        }
        out
    }

    #[test]
    fn test_empty_batch() {
        let chain: Arc<dyn ChainReader> = Arc::new(MemoryChain::new(ChainConfig::default()));
        let engine = PowEngine::new(EngineConfig::fake());
        let (_abort, results) = engine.verify_headers(chain, vec![], vec![]);
        assert!(results.recv().is_err());
    }

    #[test]
    fn test_full_fake_accepts_everything() {
        let chain: Arc<dyn ChainReader> = Arc::new(MemoryChain::new(ChainConfig::default()));
        let engine = PowEngine::new(EngineConfig::full_fake());
        let junk = vec![Header { number: 5, ..Default::default() }; 3];
        let (_abort, results) = engine.verify_headers(chain, junk, vec![true; 3]);
        let got: Vec<_> = results.iter().collect();
        assert_eq!(got, vec![Ok(()), Ok(()), Ok(())]);
    }

    #[test]
    fn test_batch_self_chains_and_isolates_errors() {
        let config = ChainConfig::default();
        let g = genesis();
        let memory = MemoryChain::new(config.clone());
        memory.insert_header(g.clone());

        let mut headers = build_chain(&config, &g, 6);
        // breaking header 3 changes its hash, so header 4 no longer chains
        // onto it and misses in the store
        headers[3].gas_used = headers[3].gas_limit + 1;

        let chain: Arc<dyn ChainReader> = Arc::new(memory);
        let engine = PowEngine::new(EngineConfig::fake());
        let (_abort, results) = engine.verify_headers(chain, headers, vec![]);
        let got: Vec<_> = results.iter().collect();

        assert_eq!(got.len(), 6);
        assert!(got[0].is_ok() && got[1].is_ok() && got[2].is_ok());
        assert!(matches!(got[3], Err(ConsensusError::GasUsedExceedsLimit { .. })));
        assert_eq!(got[4], Err(ConsensusError::UnknownAncestor));
        assert!(got[5].is_ok());
    }

    #[test]
    fn test_known_and_genesis_short_circuit() {
        let config = ChainConfig::default();
        let g = genesis();
        let memory = MemoryChain::new(config.clone());

        let headers = build_chain(&config, &g, 2);
        // parent of headers[0] is unknown, but headers[0] itself is stored
        memory.insert_header(headers[0].clone());

        let chain: Arc<dyn ChainReader> = Arc::new(memory);
        let engine = PowEngine::new(EngineConfig::fake());
        let batch = vec![g, headers[0].clone(), headers[1].clone()];
        let (_abort, results) = engine.verify_headers(chain, batch, vec![]);
        let got: Vec<_> = results.iter().collect();
        assert_eq!(got, vec![Ok(()), Ok(()), Ok(())]);
    }

    #[test]
    fn test_abort_handle() {
        let handle = AbortHandle::default();
        let other = handle.clone();
        assert!(!other.is_aborted());
        handle.abort();
        assert!(other.is_aborted());
    }
}
