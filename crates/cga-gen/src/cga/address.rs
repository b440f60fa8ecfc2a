//! Interface identifier assembly from Hash1.

use std::net::Ipv6Addr;

use log::trace;

use super::framing;
use super::types::{CgaParams, SecurityParameter, SubnetPrefix};
use crate::crypto::digest::HashEngine;

/// Bits of interface identifier byte 0 that come from Hash1.
///
/// The top three bits carry Sec and the two low bits are the u
/// ("universal/local") and g ("individual/group") bits, always zero.
pub const IID_HASH_MASK: u8 = 0x1c;

const SEC_SHIFT: u8 = 5;

/// Overwrite Sec and clear the u and g bits in place.
pub fn encode_sec(iid: &mut [u8; 8], sec: SecurityParameter) {
    iid[0] = (iid[0] & IID_HASH_MASK) | (sec.value() << SEC_SHIFT);
}

/// The leftmost 64 bits of Hash1, before Sec is encoded.
pub fn raw_interface_id<H: HashEngine + ?Sized>(engine: &H, params: &CgaParams) -> [u8; 8] {
    let hash1 = engine.digest(&framing::hash1_input(params));
    trace!(
        "hash1 for collision count {}: {:02x?}",
        params.collision_count,
        &hash1[..8]
    );
    let mut iid = [0u8; 8];
    iid.copy_from_slice(&hash1[..8]);
    iid
}

/// The finished interface identifier for `params` at `sec`.
pub fn interface_id<H: HashEngine + ?Sized>(
    engine: &H,
    params: &CgaParams,
    sec: SecurityParameter,
) -> [u8; 8] {
    let mut iid = raw_interface_id(engine, params);
    encode_sec(&mut iid, sec);
    iid
}

/// Join a prefix and an interface identifier into an address.
pub fn assemble(prefix: &SubnetPrefix, iid: &[u8; 8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets[..8].copy_from_slice(prefix.as_bytes());
    octets[8..].copy_from_slice(iid);
    Ipv6Addr::from(octets)
}

/// The address `params` produce at `sec`.
pub fn derive_address<H: HashEngine + ?Sized>(
    engine: &H,
    params: &CgaParams,
    sec: SecurityParameter,
) -> Ipv6Addr {
    assemble(&params.prefix, &interface_id(engine, params, sec))
}

/// The low 64 bits of an address.
pub fn interface_id_of(address: &Ipv6Addr) -> [u8; 8] {
    let mut iid = [0u8; 8];
    iid.copy_from_slice(&address.octets()[8..]);
    iid
}

/// The high 64 bits of an address.
pub fn prefix_of(address: &Ipv6Addr) -> SubnetPrefix {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&address.octets()[..8]);
    SubnetPrefix::from_bytes(prefix)
}
