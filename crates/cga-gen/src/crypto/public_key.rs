//! Public key input.
//!
//! A CGA hashes the DER-encoded SubjectPublicKeyInfo of its owner. Keys
//! arrive either as that DER or wrapped in a `PUBLIC KEY` PEM block;
//! anything else (private keys, certificates, bare key bits) is refused
//! before it can end up in a hash or a published parameter document.

use pkcs8::der::{Decode, DecodePem, Encode};
use pkcs8::spki::{SubjectPublicKeyInfoOwned, SubjectPublicKeyInfoRef};

use crate::error::{CgaError, Result};

const PEM_PREAMBLE: &[u8] = b"-----BEGIN";

/// Decode a public key file into the DER SubjectPublicKeyInfo bytes
/// that go into the CGA hashes.
pub fn decode_public_key(input: &[u8]) -> Result<Vec<u8>> {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .ok_or_else(|| CgaError::InvalidInput("public key is empty".into()))?;
    let input = &input[start..];

    if input.starts_with(PEM_PREAMBLE) {
        let text = std::str::from_utf8(input)
            .map_err(|_| CgaError::InvalidInput("PEM public key is not valid UTF-8".into()))?;
        let spki = SubjectPublicKeyInfoOwned::from_pem(text.trim_end()).map_err(|e| {
            CgaError::InvalidInput(format!("expected a PEM 'PUBLIC KEY' block: {e}"))
        })?;
        spki.to_der()
            .map_err(|e| CgaError::InvalidInput(format!("could not re-encode public key: {e}")))
    } else {
        SubjectPublicKeyInfoRef::from_der(input).map_err(|e| {
            CgaError::InvalidInput(format!("not a DER SubjectPublicKeyInfo: {e}"))
        })?;
        Ok(input.to_vec())
    }
}
