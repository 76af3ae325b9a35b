//! LightMix: memory-touching reference seal hash
//!
//! A per-epoch dataset is expanded from the epoch number with SplitMix64 and
//! cached process-wide. Each hash folds the seed and nonce into a 128-bit
//! state, walks `mix_iters` dependent dataset reads, expands the state to the
//! 32-byte mix digest and commits it with BLAKE3.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::pow::PowHasher;
use crate::types::Hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MixParams {
    /// Dataset size in u64 words (rounded up to a power of two)
    pub dataset_words: usize,
    pub mix_iters: u32,
    pub epoch_blocks: u64,
}

impl MixParams {
    pub fn normal() -> Self {
        Self {
            dataset_words: 1 << 17, // 1 MiB
            mix_iters: 64,
            epoch_blocks: 30_000,
        }
    }

    /// Small dataset for tests and `PowMode::Test`
    pub fn test() -> Self {
        Self {
            dataset_words: 1 << 10,
            mix_iters: 16,
            epoch_blocks: 100,
        }
    }

    pub fn epoch(&self, number: u64) -> u64 {
        number / self.epoch_blocks.max(1)
    }
}

impl Default for MixParams {
    fn default() -> Self {
        Self::normal()
    }
}

const MAX_CACHED_EPOCHS: usize = 3;

/// Key: (epoch, dataset_words)
type DatasetCache = HashMap<(u64, usize), Arc<Vec<u64>>>;
static DATASET_CACHE: Lazy<Mutex<DatasetCache>> = Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Clone)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

/// Expand 128 bits of state to 32 bytes
#[inline]
fn expand_256(mut a: u64, mut b: u64) -> Hash {
    for _ in 0..4 {
        a = a.rotate_left(13) ^ b.wrapping_mul(0x9E3779B185EBCA87);
        b = b.rotate_left(17) ^ a.wrapping_mul(0xC2B2AE3D27D4EB4F);
    }
    let mut sm = SplitMix64::new(a ^ b ^ 0xD6E8FEB86659FD93);
    let c = sm.next();
    let d = sm.next();
    let mut out = [0u8; 32];
    out[..8].copy_from_slice(&a.to_be_bytes());
    out[8..16].copy_from_slice(&b.to_be_bytes());
    out[16..24].copy_from_slice(&c.to_be_bytes());
    out[24..32].copy_from_slice(&d.to_be_bytes());
    out
}

#[inline]
fn fold_seed(seed: &Hash, salt: u64) -> u64 {
    let mut s: u64 = salt ^ 0xA24BAED4963EE407;
    for chunk in seed.chunks(8) {
        let mut v = [0u8; 8];
        v.copy_from_slice(chunk);
        s ^= u64::from_be_bytes(v).rotate_left(7);
        s = s.wrapping_mul(0x9E3779B97F4A7C15).rotate_left(9);
    }
    s
}

fn build_dataset(words: usize, epoch: u64) -> Vec<u64> {
    let mut sm = SplitMix64::new(epoch ^ 0x5851F42D4C957F2D);
    (0..words).map(|_| sm.next()).collect()
}

/// Get or build the dataset for `epoch`
fn cached_dataset(params: &MixParams, epoch: u64) -> Arc<Vec<u64>> {
    let words = params.dataset_words.max(1).next_power_of_two();
    let key = (epoch, words);

    if let Some(ds) = DATASET_CACHE.lock().get(&key) {
        return Arc::clone(ds);
    }

    let ds = Arc::new(build_dataset(words, epoch));
    tracing::debug!(epoch, words, "[LIGHTMIX] built dataset");

    let mut cache = DATASET_CACHE.lock();
    cache.insert(key, Arc::clone(&ds));
    if cache.len() > MAX_CACHED_EPOCHS {
        // evict the oldest epoch that is not the one just built
        if let Some(oldest) = cache.keys().filter(|k| **k != key).min().copied() {
            cache.remove(&oldest);
        }
    }
    ds
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LightMix {
    params: MixParams,
}

impl LightMix {
    pub fn new(params: MixParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MixParams {
        &self.params
    }
}

impl PowHasher for LightMix {
    fn compute(&self, seed: &Hash, nonce: u64, number: u64) -> (Hash, Hash) {
        let dataset = cached_dataset(&self.params, self.params.epoch(number));
        let mask = dataset.len() - 1;

        let mut a = fold_seed(seed, 0x243F_6A88_85A3_08D3) ^ nonce.rotate_left(17);
        let mut b = fold_seed(seed, 0x1319_8A2E_0370_7344) ^ nonce.rotate_right(11);

        for i in 0..self.params.mix_iters {
            let idx = ((a ^ b.rotate_left(i % 64)) as usize) & mask;
            let v = dataset[idx];
            a = a.rotate_left(13) ^ v.wrapping_mul(0x9E3779B185EBCA87);
            b = b.wrapping_add(v ^ a).rotate_left(17);
        }

        let digest = expand_256(a, b);

        let mut hasher = blake3::Hasher::new();
        hasher.update(seed);
        hasher.update(&nonce.to_be_bytes());
        hasher.update(&digest);
        (digest, *hasher.finalize().as_bytes())
    }
}
