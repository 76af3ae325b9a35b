//! Canonical header encoding
//!
//! Stable binary layout hashed to produce header identities:
//! MAGIC + VERSION + parent + uncle_hash + coinbase + state_root + number
//! + time + difficulty + gas_limit + gas_used + extra + protocol version
//! + super flag [+ mix_digest + nonce]
//!
//! Variable-length fields are length-prefixed (u32 LE) so no two field sets
//! share an encoding.

use crate::types::Header;

const MAGIC: &[u8; 4] = b"VHDR";
const ENCODING_VERSION: u32 = 1;

fn put_var(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Encode a header; `with_seal = false` yields the PoW seed encoding
pub fn header_bytes(h: &Header, with_seal: bool) -> Vec<u8> {
    let time = h.time.to_bytes_be();
    let difficulty = h.difficulty.to_bytes_be();
    let mut out = Vec::with_capacity(
        4 + 4 + 32 * 3 + 20 + 8 * 3 + 12 + time.len() + difficulty.len() + h.extra.len() + 64,
    );

    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&ENCODING_VERSION.to_le_bytes());

    out.extend_from_slice(&h.parent_hash);
    out.extend_from_slice(&h.uncle_hash);
    out.extend_from_slice(&h.coinbase);
    out.extend_from_slice(&h.state_root);
    out.extend_from_slice(&h.number.to_le_bytes());
    put_var(&mut out, &time);
    put_var(&mut out, &difficulty);
    out.extend_from_slice(&h.gas_limit.to_le_bytes());
    out.extend_from_slice(&h.gas_used.to_le_bytes());
    put_var(&mut out, &h.extra);
    put_var(&mut out, h.version.as_bytes());
    out.push(h.super_header as u8);

    if with_seal {
        out.extend_from_slice(&h.mix_digest);
        out.extend_from_slice(&h.nonce.to_be_bytes());
    }

    out
}
