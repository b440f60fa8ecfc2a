//! CGA generation and verification.
//!
//! The cga module provides:
//! - Value types for Sec, modifier, prefix and collision count
//! - Hash1/Hash2 input framing and the CGA Parameters wire format
//! - The cancellable modifier search
//! - Interface identifier assembly
//! - The collision-count retry loop driven by a DAD oracle
//! - Third-party verification

pub mod address;
pub mod engine;
pub mod framing;
pub mod search;
pub mod types;
pub mod verify;

pub use types::{CgaParams, CollisionCount, Modifier, SecurityParameter, SubnetPrefix};

pub use engine::{
    generate, generate_with, DadPolicy, GeneratedCga, GenerationRequest, GenerationRequestBuilder,
};
pub use search::{modifier_satisfies, search_modifier, CancelToken, SearchStats};
pub use verify::{verify, verify_with, CgaVerification};
