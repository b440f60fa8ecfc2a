//! Hash input framing and the CGA Parameters wire format.
//!
//! Both hashes run over the same layout:
//!
//! ```text
//! +----------+---------------+-----------------+------------+------------+
//! | modifier | subnet prefix | collision count | public key | extensions |
//! |   16 B   |      8 B      |       1 B       |  DER (var) |    (var)   |
//! +----------+---------------+-----------------+------------+------------+
//! ```
//!
//! Hash1 frames the real prefix and count, which makes the Hash1 input
//! byte-for-byte the CGA Parameters structure carried on the wire.
//! Hash2 zeroes those nine bytes so the modifier search is independent
//! of the subnet the address ends up in.

use pkcs8::der::{self, Decode, Header, Reader, SliceReader, Tag};

use super::types::{CgaParams, CollisionCount, Modifier, SecurityParameter, SubnetPrefix};
use crate::crypto::digest::DIGEST_LEN;
use crate::error::{CgaError, Result};

/// Bytes before the public key: modifier, prefix and collision count.
pub const FIXED_LEN: usize = Modifier::LEN + SubnetPrefix::LEN + 1;

/// Hash2 bits that take part in the Sec condition.
pub const HASH2_BITS: usize = 112;

fn frame(
    modifier: &Modifier,
    prefix: &[u8; 8],
    collision_count: u8,
    public_key: &[u8],
    extensions: &[Vec<u8>],
) -> Vec<u8> {
    let ext_len: usize = extensions.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(FIXED_LEN + public_key.len() + ext_len);
    out.extend_from_slice(modifier.as_bytes());
    out.extend_from_slice(prefix);
    out.push(collision_count);
    out.extend_from_slice(public_key);
    for ext in extensions {
        out.extend_from_slice(ext);
    }
    out
}

/// The Hash1 input for a set of parameters.
pub fn hash1_input(params: &CgaParams) -> Vec<u8> {
    frame(
        &params.modifier,
        params.prefix.as_bytes(),
        params.collision_count.value(),
        &params.public_key,
        &params.extensions,
    )
}

/// The Hash2 input: prefix and collision count framed as zeros.
pub fn hash2_input(modifier: &Modifier, public_key: &[u8], extensions: &[Vec<u8>]) -> Vec<u8> {
    frame(modifier, &[0u8; 8], 0, public_key, extensions)
}

/// Whether a Hash2 digest has the `16 * Sec` leading zero bits Sec demands.
///
/// `16 * Sec` is always a whole number of bytes and never exceeds the
/// leftmost 112 bits.
pub fn hash2_satisfies(hash2: &[u8; DIGEST_LEN], sec: SecurityParameter) -> bool {
    let zero_bytes = sec.zero_bits() / 8;
    debug_assert!(sec.zero_bits() <= HASH2_BITS);
    hash2[..zero_bytes].iter().all(|&b| b == 0)
}

impl CgaParams {
    /// Encode as the RFC 3972 CGA Parameters structure.
    pub fn to_bytes(&self) -> Vec<u8> {
        hash1_input(self)
    }

    /// Decode an RFC 3972 CGA Parameters structure.
    ///
    /// The public key length comes from its DER SEQUENCE header. Any
    /// bytes after the key are kept as a single extension block; the
    /// hashes only see their concatenation, so block boundaries do not
    /// matter for verification.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FIXED_LEN {
            return Err(CgaError::InvalidParameters(format!(
                "need at least {FIXED_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let modifier = Modifier::from_slice(&bytes[..16])
            .map_err(|e| CgaError::InvalidParameters(e.to_string()))?;
        let prefix = SubnetPrefix::from_slice(&bytes[16..24])
            .map_err(|e| CgaError::InvalidParameters(e.to_string()))?;
        let collision_count = CollisionCount::new(bytes[24])
            .map_err(|e| CgaError::InvalidParameters(e.to_string()))?;

        let rest = &bytes[FIXED_LEN..];
        let key_len = der_element_len(rest)?;
        let (public_key, tail) = rest.split_at(key_len);

        let extensions = if tail.is_empty() {
            Vec::new()
        } else {
            vec![tail.to_vec()]
        };

        Ok(Self {
            modifier,
            prefix,
            collision_count,
            public_key: public_key.to_vec(),
            extensions,
        })
    }
}

/// Total length (header plus content) of the DER SEQUENCE at the start of `bytes`.
fn der_element_len(bytes: &[u8]) -> Result<usize> {
    if bytes.is_empty() {
        return Err(CgaError::InvalidParameters("missing public key".into()));
    }
    let invalid = |e: der::Error| CgaError::InvalidParameters(format!("public key header: {e}"));

    let mut reader = SliceReader::new(bytes).map_err(invalid)?;
    let header = Header::decode(&mut reader).map_err(invalid)?;
    if header.tag != Tag::Sequence {
        return Err(CgaError::InvalidParameters(format!(
            "public key must start with a DER SEQUENCE, found {}",
            header.tag
        )));
    }

    let header_len = usize::try_from(reader.position()).map_err(invalid)?;
    let content_len = usize::try_from(header.length).map_err(invalid)?;
    let total = header_len + content_len;
    if total > bytes.len() {
        return Err(CgaError::InvalidParameters(format!(
            "public key claims {total} bytes but only {} remain",
            bytes.len()
        )));
    }
    Ok(total)
}
