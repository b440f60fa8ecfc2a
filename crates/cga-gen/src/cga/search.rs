//! Modifier search: the Hash2 brute force.
//!
//! For Sec > 0 the search is the dominant cost of generating a CGA:
//! on average 2^(16 * Sec) hash evaluations. The loop reuses a single
//! framed buffer and only rewrites the 16 modifier bytes per step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use super::framing;
use super::types::{Modifier, SecurityParameter};
use crate::crypto::digest::HashEngine;
use crate::error::{CgaError, Result};

/// Shared flag for aborting a running modifier search.
///
/// Clones share the flag, so a token can be handed to another thread
/// (or a signal handler) and raised there.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to stop before its next hash evaluation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How much work settling on a modifier took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Hash2 evaluations performed. Zero when Sec is 0.
    pub iterations: u64,
    /// Whether the modifier came from the caller rather than a search.
    pub pinned: bool,
}

/// Check a single modifier against the Sec condition.
pub fn modifier_satisfies<H: HashEngine + ?Sized>(
    engine: &H,
    modifier: &Modifier,
    sec: SecurityParameter,
    public_key: &[u8],
    extensions: &[Vec<u8>],
) -> bool {
    if sec.value() == 0 {
        return true;
    }
    let input = framing::hash2_input(modifier, public_key, extensions);
    framing::hash2_satisfies(&engine.digest(&input), sec)
}

/// Increment from `start` until Hash2 has `16 * Sec` leading zero bits.
///
/// `start` itself is the first candidate. The token is checked before
/// every hash evaluation.
pub fn search_modifier<H: HashEngine + ?Sized>(
    engine: &H,
    start: Modifier,
    sec: SecurityParameter,
    public_key: &[u8],
    extensions: &[Vec<u8>],
    cancel: &CancelToken,
) -> Result<(Modifier, SearchStats)> {
    if sec.value() == 0 {
        return Ok((start, SearchStats::default()));
    }

    let mut buf = framing::hash2_input(&start, public_key, extensions);
    let mut candidate = start;
    let mut iterations = 0u64;

    loop {
        if cancel.is_cancelled() {
            debug!("modifier search cancelled after {iterations} iterations");
            return Err(CgaError::Cancelled { iterations });
        }

        buf[..Modifier::LEN].copy_from_slice(candidate.as_bytes());
        let hash2 = engine.digest(&buf);
        iterations += 1;

        if framing::hash2_satisfies(&hash2, sec) {
            debug!("modifier found for sec {sec} after {iterations} iterations");
            return Ok((
                candidate,
                SearchStats {
                    iterations,
                    pinned: false,
                },
            ));
        }

        candidate = candidate.wrapping_next();
    }
}

/// Accept a pinned modifier or search from a random one.
///
/// A pinned modifier is checked once and never searched past.
pub(crate) fn resolve_modifier<H: HashEngine + ?Sized>(
    engine: &H,
    pinned: Option<Modifier>,
    sec: SecurityParameter,
    public_key: &[u8],
    extensions: &[Vec<u8>],
    cancel: &CancelToken,
) -> Result<(Modifier, SearchStats)> {
    match pinned {
        Some(modifier) => {
            if !modifier_satisfies(engine, &modifier, sec, public_key, extensions) {
                return Err(CgaError::InvalidModifier { sec: sec.value() });
            }
            let stats = SearchStats {
                iterations: u64::from(sec.value() > 0),
                pinned: true,
            };
            Ok((modifier, stats))
        }
        None => search_modifier(
            engine,
            Modifier::random(),
            sec,
            public_key,
            extensions,
            cancel,
        ),
    }
}
