//! Duplicate address detection: the oracle seam.
//!
//! The engine never touches the network. It hands each candidate
//! address to a `DadOracle` and acts on the answer:
//!
//! - `Free` ends generation successfully.
//! - `InUse` moves on to the next collision count.
//! - Any `DadError` aborts generation as `CgaError::DadUnavailable`.
//!
//! A live neighbor-discovery probe needs raw sockets and elevated
//! privilege; implementations map those failures onto `DadError`.

pub mod table;

use std::net::Ipv6Addr;
use std::time::Duration;

pub use table::NeighborTable;

/// What a probe learned about a candidate address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DadOutcome {
    /// No other node answered for the address.
    Free,
    /// Another node already owns the address.
    InUse,
}

/// Why a probe could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DadError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Answers "is this address already in use on the link?".
///
/// `timeout` bounds how long the probe may wait for a defending
/// neighbor. The engine runs each probe on its own thread and stops
/// waiting once `timeout` has passed, so an oracle that hangs costs one
/// parked thread, never a stuck generation.
pub trait DadOracle: Send + Sync + 'static {
    fn probe(&self, candidate: Ipv6Addr, timeout: Duration) -> Result<DadOutcome, DadError>;
}

impl<F> DadOracle for F
where
    F: Fn(Ipv6Addr, Duration) -> Result<DadOutcome, DadError> + Send + Sync + 'static,
{
    fn probe(&self, candidate: Ipv6Addr, timeout: Duration) -> Result<DadOutcome, DadError> {
        self(candidate, timeout)
    }
}

/// Oracle for callers that never probe. Reports every address free.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDad;

impl DadOracle for NoDad {
    fn probe(&self, _candidate: Ipv6Addr, _timeout: Duration) -> Result<DadOutcome, DadError> {
        Ok(DadOutcome::Free)
    }
}
