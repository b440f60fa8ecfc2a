//! Static neighbor table oracle.
//!
//! Answers from a fixed set of addresses known to be taken, such as an
//! exported neighbor cache. Useful for planning addresses offline and
//! for scripted collisions in tests.

use std::collections::HashSet;
use std::net::Ipv6Addr;
use std::time::Duration;

use super::{DadError, DadOracle, DadOutcome};

/// A fixed set of occupied addresses.
#[derive(Debug, Clone, Default)]
pub struct NeighborTable {
    occupied: HashSet<Ipv6Addr>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an address as taken. Returns false if it already was.
    pub fn insert(&mut self, address: Ipv6Addr) -> bool {
        self.occupied.insert(address)
    }

    pub fn contains(&self, address: &Ipv6Addr) -> bool {
        self.occupied.contains(address)
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}

impl FromIterator<Ipv6Addr> for NeighborTable {
    fn from_iter<I: IntoIterator<Item = Ipv6Addr>>(iter: I) -> Self {
        Self {
            occupied: iter.into_iter().collect(),
        }
    }
}

impl DadOracle for NeighborTable {
    fn probe(&self, candidate: Ipv6Addr, _timeout: Duration) -> Result<DadOutcome, DadError> {
        if self.contains(&candidate) {
            Ok(DadOutcome::InUse)
        } else {
            Ok(DadOutcome::Free)
        }
    }
}
