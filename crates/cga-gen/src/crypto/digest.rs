//! Hash engines.
//!
//! RFC 3972 mandates SHA-1 for both Hash1 and Hash2. The engine is a
//! trait so that a different 160-bit digest can be substituted with the
//! same framing; such addresses do not interoperate with SHA-1 CGAs.

use sha1::{Digest, Sha1};
use sha2::Sha256;

/// Length in bytes of every engine's output.
pub const DIGEST_LEN: usize = 20;

/// A 160-bit digest over an arbitrary byte sequence.
pub trait HashEngine {
    /// Hash `input`. Never fails.
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN];
}

/// SHA-1, the interoperable RFC 3972 engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Engine;

impl HashEngine for Sha1Engine {
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        let full = Sha1::digest(input);
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&full);
        out
    }
}

/// Leftmost 160 bits of SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Trunc160;

impl HashEngine for Sha256Trunc160 {
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        let full = Sha256::digest(input);
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&full[..DIGEST_LEN]);
        out
    }
}

impl<H: HashEngine + ?Sized> HashEngine for &H {
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        (**self).digest(input)
    }
}
