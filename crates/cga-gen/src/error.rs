//! Error types for cga-gen.
//!
//! Every failure is returned as a value. The engine retries nothing
//! except a DAD collision, which never surfaces here unless all three
//! collision counts are taken.

use crate::dad::DadError;

/// Error types covering generation, verification and parameter codecs.
#[derive(Debug, thiserror::Error)]
pub enum CgaError {
    /// A caller-pinned modifier does not satisfy the Hash2 condition.
    #[error("Modifier does not satisfy the Hash2 condition for sec {sec}")]
    InvalidModifier { sec: u8 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Collision counts 0, 1 and 2 are all in use for this modifier.
    #[error("Address space exhausted: all collision counts are in use, generate a new modifier")]
    AddressSpaceExhausted,

    #[error("Duplicate address detection unavailable: {0}")]
    DadUnavailable(#[from] DadError),

    #[error("Modifier search cancelled after {iterations} iterations")]
    Cancelled { iterations: u64 },

    #[error("Invalid CGA parameters: {0}")]
    InvalidParameters(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CgaError>;
