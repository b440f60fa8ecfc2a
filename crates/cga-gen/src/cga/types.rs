//! Value types for CGA generation.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::crypto::random;
use crate::error::{CgaError, Result};

// ---------------------------------------------------------------------------
// Security Parameter
// ---------------------------------------------------------------------------

/// The Sec value, in `0..=7`.
///
/// Each step multiplies the expected cost of the modifier search by 2^16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SecurityParameter(u8);

impl SecurityParameter {
    pub const ZERO: Self = Self(0);
    pub const MAX: u8 = 7;

    /// Validate and wrap a Sec value.
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(CgaError::InvalidInput(format!(
                "sec must be in 0..={}, got {value}",
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    /// Read Sec from the three most significant bits of an interface identifier.
    pub fn from_interface_id(iid: &[u8; 8]) -> Self {
        Self(iid[0] >> 5)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Number of leading Hash2 bits that must be zero (`16 * Sec`).
    pub fn zero_bits(self) -> usize {
        16 * self.0 as usize
    }
}

impl TryFrom<u8> for SecurityParameter {
    type Error = CgaError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for SecurityParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Modifier
// ---------------------------------------------------------------------------

/// The 128-bit modifier, stored big-endian as it is framed into both hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifier([u8; 16]);

impl Modifier {
    pub const LEN: usize = 16;

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Build a modifier from a slice that must be exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 16] = bytes.try_into().map_err(|_| {
            CgaError::InvalidInput(format!(
                "modifier must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Draw a modifier from the operating system CSPRNG.
    pub fn random() -> Self {
        Self(random::random_modifier_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// The next modifier in search order, wrapping at 2^128.
    pub fn wrapping_next(self) -> Self {
        Self::from(self.to_u128().wrapping_add(1))
    }

    /// Encode with the standard base64 alphabet.
    pub fn to_base64(&self) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, self.0)
    }

    /// Decode a base64 modifier. Surrounding whitespace, such as the
    /// trailing newline of a modifier file, is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded.trim())
                .map_err(|e| CgaError::InvalidInput(format!("invalid modifier encoding: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl From<u128> for Modifier {
    fn from(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl From<[u8; 16]> for Modifier {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifier({:032x})", self.to_u128())
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

// ---------------------------------------------------------------------------
// Subnet Prefix
// ---------------------------------------------------------------------------

/// The 64-bit subnet prefix forming the high half of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetPrefix([u8; 8]);

impl SubnetPrefix {
    pub const LEN: usize = 8;
    /// The only prefix length a CGA can be formed under.
    pub const BITS: u8 = 64;

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Build a prefix from a slice that must be exactly 8 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 8] = bytes.try_into().map_err(|_| {
            CgaError::InvalidInput(format!(
                "subnet prefix must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Take the prefix from a network address.
    ///
    /// The prefix length must be 64 and the host half must be zero.
    pub fn from_network(network: Ipv6Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len != Self::BITS {
            return Err(CgaError::InvalidInput(format!(
                "prefix length must be /{}, got /{prefix_len}",
                Self::BITS
            )));
        }
        let octets = network.octets();
        if octets[8..].iter().any(|&b| b != 0) {
            return Err(CgaError::InvalidInput(format!(
                "{network} has host bits set below /{}",
                Self::BITS
            )));
        }
        Self::from_slice(&octets[..8])
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn to_u64(self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// The prefix as a network address with a zero host half.
    pub fn network(&self) -> Ipv6Addr {
        let mut octets = [0u8; 16];
        octets[..8].copy_from_slice(&self.0);
        Ipv6Addr::from(octets)
    }
}

impl From<u64> for SubnetPrefix {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), Self::BITS)
    }
}

/// Parses `2001:db8:0:1::/64` or a bare `2001:db8:0:1::`.
impl FromStr for SubnetPrefix {
    type Err = CgaError;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, len) = match s.split_once('/') {
            Some((addr, len)) => {
                let len = len
                    .parse::<u8>()
                    .map_err(|e| CgaError::InvalidInput(format!("invalid prefix length: {e}")))?;
                (addr, len)
            }
            None => (s, Self::BITS),
        };
        let network = addr
            .parse::<Ipv6Addr>()
            .map_err(|e| CgaError::InvalidInput(format!("invalid prefix '{addr}': {e}")))?;
        Self::from_network(network, len)
    }
}

// ---------------------------------------------------------------------------
// Collision Count
// ---------------------------------------------------------------------------

/// The collision count, in `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CollisionCount(u8);

impl CollisionCount {
    pub const ZERO: Self = Self(0);
    pub const MAX: u8 = 2;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(CgaError::InvalidInput(format!(
                "collision count must be in 0..={}, got {value}",
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The following count, or `None` once all three are used up.
    pub fn next(self) -> Option<Self> {
        (self.0 < Self::MAX).then(|| Self(self.0 + 1))
    }
}

impl TryFrom<u8> for CollisionCount {
    type Error = CgaError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for CollisionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CGA Parameters
// ---------------------------------------------------------------------------

/// Everything a third party needs to re-verify a CGA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgaParams {
    pub modifier: Modifier,
    pub prefix: SubnetPrefix,
    pub collision_count: CollisionCount,
    /// DER-encoded public key, hashed exactly as given.
    pub public_key: Vec<u8>,
    /// Opaque extension blocks, hashed in order.
    pub extensions: Vec<Vec<u8>>,
}
