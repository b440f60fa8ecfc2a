//! cga-gen: IPv6 Cryptographically Generated Addresses (RFC 3972).
//!
//! Binds an IPv6 interface identifier to a public key through two SHA-1
//! hashes: Hash2 makes address generation deliberately expensive in
//! proportion to the security parameter, Hash1 produces the identifier.
//! Duplicate address detection is delegated to a pluggable oracle so the
//! cryptographic work stays testable without a network.

pub mod cga;
pub mod crypto;
pub mod dad;
pub mod encoding;
pub mod error;

// Re-export primary types
pub use cga::{
    generate, generate_with, verify, verify_with, CancelToken, CgaParams, CgaVerification,
    CollisionCount, DadPolicy, GeneratedCga, GenerationRequest, GenerationRequestBuilder,
    Modifier, SearchStats, SecurityParameter, SubnetPrefix,
};
pub use crypto::digest::{HashEngine, Sha1Engine, Sha256Trunc160};
pub use crypto::public_key::decode_public_key;
pub use dad::{DadError, DadOracle, DadOutcome, NeighborTable, NoDad};
pub use encoding::ParamsDocument;
pub use error::{CgaError, Result};
