//! CGA generation: modifier resolution plus the collision-count loop.
//!
//! ```text
//!            pinned count?
//!   start ──────yes──────> Attempt(n) ──> Success
//!     │ no
//!     v
//!   Attempt(0) ──DAD off / Free──> Success
//!     │ InUse
//!     v
//!   Attempt(1) ──Free──> Success
//!     │ InUse
//!     v
//!   Attempt(2) ──Free──> Success
//!     │ InUse
//!     v
//!   Failure(AddressSpaceExhausted)
//! ```
//!
//! Every attempt reuses the same modifier. A probe error at any attempt
//! is `Failure(DadUnavailable)`, and so is a probe that has not answered
//! when the policy's timeout runs out.

use std::net::Ipv6Addr;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;

use super::address;
use super::search::{self, CancelToken, SearchStats};
use super::types::{CgaParams, CollisionCount, Modifier, SecurityParameter, SubnetPrefix};
use crate::crypto::digest::{HashEngine, Sha1Engine};
use crate::dad::{DadError, DadOracle, DadOutcome};
use crate::error::{CgaError, Result};

// ---------------------------------------------------------------------------
// DAD Policy
// ---------------------------------------------------------------------------

/// Whether candidate addresses are probed before being accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DadPolicy {
    /// Accept the collision count 0 address without probing.
    #[default]
    Disabled,
    /// Probe every candidate, waiting at most `timeout` per probe.
    Enabled { timeout: Duration },
}

impl DadPolicy {
    /// One RetransTimer (RFC 4861), the wait for a single DAD probe.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Probing with the default timeout.
    pub fn enabled() -> Self {
        Self::Enabled {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

// ---------------------------------------------------------------------------
// Generation Request
// ---------------------------------------------------------------------------

/// A validated generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prefix: SubnetPrefix,
    public_key: Vec<u8>,
    sec: SecurityParameter,
    extensions: Vec<Vec<u8>>,
    modifier: Option<Modifier>,
    collision_count: Option<CollisionCount>,
    dad: DadPolicy,
}

impl GenerationRequest {
    /// Start building a request for `public_key` under `prefix`.
    pub fn builder(prefix: SubnetPrefix, public_key: impl Into<Vec<u8>>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(prefix, public_key)
    }

    pub fn prefix(&self) -> SubnetPrefix {
        self.prefix
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn sec(&self) -> SecurityParameter {
        self.sec
    }

    pub fn extensions(&self) -> &[Vec<u8>] {
        &self.extensions
    }

    pub fn modifier(&self) -> Option<Modifier> {
        self.modifier
    }

    pub fn collision_count(&self) -> Option<CollisionCount> {
        self.collision_count
    }

    pub fn dad(&self) -> DadPolicy {
        self.dad
    }
}

/// Builder for generation requests. Values are validated by `build`.
pub struct GenerationRequestBuilder {
    prefix: SubnetPrefix,
    public_key: Vec<u8>,
    sec: u8,
    extensions: Vec<Vec<u8>>,
    modifier: Option<Modifier>,
    collision_count: Option<u8>,
    dad: DadPolicy,
}

impl GenerationRequestBuilder {
    pub fn new(prefix: SubnetPrefix, public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix,
            public_key: public_key.into(),
            sec: 0,
            extensions: Vec::new(),
            modifier: None,
            collision_count: None,
            dad: DadPolicy::Disabled,
        }
    }

    /// Set the security parameter (0..=7, default 0).
    pub fn sec(mut self, sec: u8) -> Self {
        self.sec = sec;
        self
    }

    /// Append one extension block.
    pub fn extension(mut self, ext: impl Into<Vec<u8>>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    /// Append extension blocks in order.
    pub fn extensions<I, E>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Vec<u8>>,
    {
        self.extensions.extend(exts.into_iter().map(Into::into));
        self
    }

    /// Pin the modifier instead of searching for one.
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Pin the collision count (0..=2). Pinning skips DAD entirely.
    pub fn collision_count(mut self, count: u8) -> Self {
        self.collision_count = Some(count);
        self
    }

    pub fn dad(mut self, policy: DadPolicy) -> Self {
        self.dad = policy;
        self
    }

    /// Validate and finalize the request.
    pub fn build(self) -> Result<GenerationRequest> {
        if self.public_key.is_empty() {
            return Err(CgaError::InvalidInput("public key is empty".into()));
        }
        let sec = SecurityParameter::new(self.sec)?;
        let collision_count = self
            .collision_count
            .map(CollisionCount::new)
            .transpose()?;
        if let DadPolicy::Enabled { timeout } = self.dad {
            if timeout.is_zero() {
                return Err(CgaError::InvalidInput("DAD timeout must be non-zero".into()));
            }
        }

        Ok(GenerationRequest {
            prefix: self.prefix,
            public_key: self.public_key,
            sec,
            extensions: self.extensions,
            modifier: self.modifier,
            collision_count,
            dad: self.dad,
        })
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A generated address and the parameters that prove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCga {
    pub address: Ipv6Addr,
    pub params: CgaParams,
    pub sec: SecurityParameter,
    pub search: SearchStats,
    /// DAD probes sent, at most three.
    pub probes: u8,
}

/// Where the retry loop goes after a probe answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Accept,
    Retry(CollisionCount),
}

fn next_transition(outcome: DadOutcome, current: CollisionCount) -> Result<Transition> {
    match outcome {
        DadOutcome::Free => Ok(Transition::Accept),
        DadOutcome::InUse => current
            .next()
            .map(Transition::Retry)
            .ok_or(CgaError::AddressSpaceExhausted),
    }
}

/// Probe once on a worker thread and wait at most `timeout` for it.
///
/// A worker that misses the deadline is left to finish on its own; its
/// late answer goes to a dropped receiver.
fn probe_bounded<O: DadOracle + ?Sized>(
    oracle: &Arc<O>,
    candidate: Ipv6Addr,
    timeout: Duration,
) -> Result<DadOutcome> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(oracle);
    thread::Builder::new()
        .name("cga-dad-probe".into())
        .spawn(move || {
            let _ = tx.send(worker.probe(candidate, timeout));
        })
        .map_err(|e| DadError::Transport(format!("could not start probe thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(answer) => Ok(answer?),
        Err(RecvTimeoutError::Timeout) => {
            debug!("DAD probe for {candidate} gave no answer within {timeout:?}");
            Err(DadError::Timeout(timeout).into())
        }
        Err(RecvTimeoutError::Disconnected) => Err(DadError::Transport(
            "probe thread exited without an answer".into(),
        )
        .into()),
    }
}

/// Generate a CGA with SHA-1.
pub fn generate<O: DadOracle + ?Sized>(
    request: &GenerationRequest,
    oracle: &Arc<O>,
    cancel: &CancelToken,
) -> Result<GeneratedCga> {
    generate_with(&Sha1Engine, request, oracle, cancel)
}

/// Generate a CGA with an explicit hash engine.
///
/// The oracle is shared with the probe threads, hence the `Arc`. It is
/// only consulted when DAD is enabled and the collision count is not
/// pinned.
pub fn generate_with<H: HashEngine + ?Sized, O: DadOracle + ?Sized>(
    engine: &H,
    request: &GenerationRequest,
    oracle: &Arc<O>,
    cancel: &CancelToken,
) -> Result<GeneratedCga> {
    let sec = request.sec;
    let (modifier, search) = search::resolve_modifier(
        engine,
        request.modifier,
        sec,
        &request.public_key,
        &request.extensions,
        cancel,
    )?;

    let mut params = CgaParams {
        modifier,
        prefix: request.prefix,
        collision_count: request.collision_count.unwrap_or_default(),
        public_key: request.public_key.clone(),
        extensions: request.extensions.clone(),
    };

    let timeout = match (request.collision_count, request.dad) {
        (Some(pinned), _) => {
            debug!("collision count {pinned} pinned, skipping duplicate address detection");
            None
        }
        (None, DadPolicy::Disabled) => None,
        (None, DadPolicy::Enabled { timeout }) => Some(timeout),
    };

    let Some(timeout) = timeout else {
        let address = address::derive_address(engine, &params, sec);
        return Ok(GeneratedCga {
            address,
            params,
            sec,
            search,
            probes: 0,
        });
    };

    let mut probes = 0u8;
    loop {
        let address = address::derive_address(engine, &params, sec);
        let outcome = probe_bounded(oracle, address, timeout)?;
        probes += 1;
        debug!(
            "DAD probe for {address} (collision count {}): {outcome:?}",
            params.collision_count
        );

        match next_transition(outcome, params.collision_count)? {
            Transition::Accept => {
                return Ok(GeneratedCga {
                    address,
                    params,
                    sec,
                    search,
                    probes,
                })
            }
            Transition::Retry(next) => params.collision_count = next,
        }
    }
}
