//! Headers, blocks and shared primitives
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::consensus_pow::encoding;
use crate::version::ProtocolVersion;

/// 32-byte content hash
pub type Hash = [u8; 32];

/// 20-byte account identifier
pub type Address = [u8; 20];

pub const ZERO_HASH: Hash = [0u8; 32];

/// Uncle-list hash of a block without uncles
pub static EMPTY_UNCLE_HASH: Lazy<Hash> = Lazy::new(|| calc_uncle_hash(&[]));

/// Hash arbitrary bytes with BLAKE3, returning 32 bytes.
pub fn blake3_hash(bytes: &[u8]) -> Hash {
    *blake3::hash(bytes).as_bytes()
}

/// Short hex form for logs (first 4 bytes)
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

/// Hash committing to an ordered uncle list
pub fn calc_uncle_hash(uncles: &[Header]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"VUNC");
    hasher.update(&(uncles.len() as u64).to_le_bytes());
    for uncle in uncles {
        hasher.update(&uncle.hash());
    }
    *hasher.finalize().as_bytes()
}

/// Block header
///
/// Identity is content-addressed: `hash()` covers every field, `hash_no_nonce()`
/// covers everything except the seal (nonce + mix digest).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(with = "hex_array")]
    pub parent_hash: Hash,
    #[serde(with = "hex_array")]
    pub uncle_hash: Hash,
    #[serde(with = "hex_array")]
    pub coinbase: Address,
    #[serde(with = "hex_array", default)]
    pub state_root: Hash,
    pub number: u64,
    #[serde(with = "decimal")]
    pub time: BigUint,
    #[serde(with = "decimal")]
    pub difficulty: BigUint,
    pub gas_limit: u64,
    pub gas_used: u64,
    #[serde(with = "hex_vec", default)]
    pub extra: Vec<u8>,
    #[serde(with = "hex_array", default)]
    pub mix_digest: Hash,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub version: ProtocolVersion,
    /// Super headers bypass the difficulty check
    #[serde(default)]
    pub super_header: bool,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: ZERO_HASH,
            uncle_hash: *EMPTY_UNCLE_HASH,
            coinbase: [0u8; 20],
            state_root: ZERO_HASH,
            number: 0,
            time: BigUint::default(),
            difficulty: BigUint::default(),
            gas_limit: 0,
            gas_used: 0,
            extra: Vec::new(),
            mix_digest: ZERO_HASH,
            nonce: 0,
            version: ProtocolVersion::default(),
            super_header: false,
        }
    }
}

impl Header {
    pub fn hash(&self) -> Hash {
        blake3_hash(&encoding::header_bytes(self, true))
    }

    /// Hash used as the PoW seed (seal fields excluded)
    pub fn hash_no_nonce(&self) -> Hash {
        blake3_hash(&encoding::header_bytes(self, false))
    }

    /// Timestamp as seconds, saturating at u64::MAX
    pub fn time_secs(&self) -> u64 {
        self.time.to_u64().unwrap_or(u64::MAX)
    }

    pub fn has_uncles(&self) -> bool {
        self.uncle_hash != *EMPTY_UNCLE_HASH
    }

    pub fn is_super_header(&self) -> bool {
        self.super_header
    }
}

/// Header plus its ordered uncle list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: Header,
    uncles: Vec<Header>,
}

impl Block {
    /// Assemble a block, committing the header to the uncle list
    pub fn new(mut header: Header, uncles: Vec<Header>) -> Self {
        header.uncle_hash = calc_uncle_hash(&uncles);
        Self { header, uncles }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn uncles(&self) -> &[Header] {
        &self.uncles
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    /// Replace the header's seal fields, keeping the body
    pub fn with_seal(&self, sealed: &Header) -> Self {
        let mut header = self.header.clone();
        header.nonce = sealed.nonce;
        header.mix_digest = sealed.mix_digest;
        Self {
            header,
            uncles: self.uncles.clone(),
        }
    }
}

/// Serde helpers: fixed-size byte arrays as 0x-prefixed hex
pub mod hex_array {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        d: D,
    ) -> Result<[u8; N], D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.strip_prefix("0x").unwrap_or(&raw);
        let bytes = hex::decode(raw).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("expected {} bytes, got {}", N, v.len())))
    }
}

/// Serde helpers: variable-length bytes as 0x-prefixed hex
pub mod hex_vec {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(D::Error::custom)
    }
}

/// Serde helpers: big integers as decimal strings
pub mod decimal {
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(d)?;
        BigUint::parse_bytes(raw.trim().as_bytes(), 10)
            .ok_or_else(|| D::Error::custom(format!("invalid decimal integer: {raw}")))
    }
}
