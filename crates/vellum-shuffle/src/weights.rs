//! Fixed, reproducible per-processor weight derivation.
//!
//! spec.md describes the key as "256-bit" while also naming the cipher
//! "AES-128" (which takes a 128-bit key); AES-128 is the concrete
//! requirement (it is what drives the block size and the `Ctr64BE` mode
//! below), so the key here is the 128 bits AES-128 actually takes, and the
//! IV is the 128-bit AES block size — see `DESIGN.md` for this resolved
//! inconsistency. Both are hard-coded and must never be regenerated,
//! rotated, or made configurable: doing so would change the routing
//! decision for every existing deployment.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

type Aes128Ctr64Be = ctr::Ctr64BE<Aes128>;

const KEY: [u8; 16] = [
    0x5a, 0x1f, 0x9e, 0x3b, 0xc4, 0x7d, 0x22, 0x88, 0x0e, 0x61, 0xaa, 0x3c, 0x95, 0x4f, 0x7b, 0x10,
];

const IV: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
];

/// Derive the `n`-processor weight sequence: `n * 4` bytes of the fixed
/// AES-128-CTR keystream over an all-zero plaintext, reinterpreted as
/// little-endian `u32`s.
pub fn derive_weights(n: usize) -> Vec<u32> {
    let mut buf = vec![0u8; n * 4];
    let mut cipher = Aes128Ctr64Be::new_from_slices(&KEY, &IV).expect("fixed 16-byte key and IV");
    cipher.apply_keystream(&mut buf);

    buf.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
