//! Cryptographic primitives for cga-gen.
//!
//! This module provides:
//! - The `HashEngine` seam with SHA-1 (RFC 3972) and a truncated SHA-256 engine
//! - Public key decoding (DER or PEM SubjectPublicKeyInfo)
//! - Cryptographically secure random number generation

pub mod digest;
pub mod public_key;
pub mod random;
