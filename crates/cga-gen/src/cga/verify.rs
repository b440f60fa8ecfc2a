//! CGA verification (RFC 3972 section 5).
//!
//! Lets any third party check that an address was generated from a
//! given parameter set, with no shared secret and no PKI.

use std::net::Ipv6Addr;

use log::debug;

use super::address::{self, IID_HASH_MASK};
use super::framing;
use super::types::{CgaParams, SecurityParameter};
use crate::crypto::digest::{HashEngine, Sha1Engine};

/// Result of verifying an address against its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgaVerification {
    /// The parameters' prefix equals the address's high 64 bits.
    pub prefix_matches: bool,
    /// Hash1 matches the identifier outside the Sec and u/g bits.
    pub hash1_valid: bool,
    /// Hash2 has the leading zero bits the encoded Sec demands.
    pub hash2_valid: bool,
    /// Sec as encoded in the address.
    pub sec: SecurityParameter,
    pub is_valid: bool,
}

/// Verify with SHA-1.
pub fn verify(address: &Ipv6Addr, params: &CgaParams) -> CgaVerification {
    verify_with(&Sha1Engine, address, params)
}

/// Verify with an explicit hash engine.
///
/// The collision count needs no check here: `CollisionCount` cannot
/// hold a value above 2, and decoding rejects one.
pub fn verify_with<H: HashEngine + ?Sized>(
    engine: &H,
    address: &Ipv6Addr,
    params: &CgaParams,
) -> CgaVerification {
    let prefix_matches = address::prefix_of(address) == params.prefix;

    let iid = address::interface_id_of(address);
    let sec = SecurityParameter::from_interface_id(&iid);

    let hash1 = address::raw_interface_id(engine, params);
    let hash1_valid =
        (hash1[0] & IID_HASH_MASK) == (iid[0] & IID_HASH_MASK) && hash1[1..] == iid[1..];

    let hash2_valid = sec.value() == 0 || {
        let input =
            framing::hash2_input(&params.modifier, &params.public_key, &params.extensions);
        framing::hash2_satisfies(&engine.digest(&input), sec)
    };

    let is_valid = prefix_matches && hash1_valid && hash2_valid;
    if !is_valid {
        debug!(
            "verification of {address} failed: prefix={prefix_matches} hash1={hash1_valid} hash2={hash2_valid}"
        );
    }

    CgaVerification {
        prefix_matches,
        hash1_valid,
        hash2_valid,
        sec,
        is_valid,
    }
}
