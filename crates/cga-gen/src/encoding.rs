//! JSON document for exchanging a CGA and its parameters.
//!
//! Binary fields are base64 (standard alphabet), the address and prefix
//! are IPv6 text:
//!
//! ```json
//! {
//!     "version": 1,
//!     "address": "2001:db8:0:1:e5:c7bc:23b6:825e",
//!     "sec": 0,
//!     "modifier": "<base64-16-bytes>",
//!     "prefix": "2001:db8:0:1::/64",
//!     "collision_count": 0,
//!     "public_key": "<base64-der>",
//!     "extensions": ["<base64>", ...]
//! }
//! ```

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

use crate::cga::{CgaParams, CollisionCount, GeneratedCga, Modifier, SubnetPrefix};
use crate::error::{CgaError, Result};

const DOCUMENT_VERSION: u32 = 1;

fn b64_encode(bytes: &[u8]) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

fn b64_decode(field: &str, encoded: &str) -> Result<Vec<u8>> {
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
        .map_err(|e| CgaError::InvalidParameters(format!("invalid base64 in {field}: {e}")))
}

/// Text form of a generated CGA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsDocument {
    pub version: u32,
    pub address: String,
    /// Informational; the authoritative Sec is the one in the address.
    pub sec: u8,
    pub modifier: String,
    pub prefix: String,
    pub collision_count: u8,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl ParamsDocument {
    /// Describe an address and the parameters it was generated from.
    pub fn new(address: Ipv6Addr, params: &CgaParams) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            address: address.to_string(),
            sec: address.octets()[8] >> 5,
            modifier: params.modifier.to_base64(),
            prefix: params.prefix.to_string(),
            collision_count: params.collision_count.value(),
            public_key: b64_encode(&params.public_key),
            extensions: params.extensions.iter().map(|e| b64_encode(e)).collect(),
        }
    }

    pub fn from_generated(cga: &GeneratedCga) -> Self {
        Self::new(cga.address, &cga.params)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CgaError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self =
            serde_json::from_str(json).map_err(|e| CgaError::Serialization(e.to_string()))?;
        if doc.version != DOCUMENT_VERSION {
            return Err(CgaError::InvalidParameters(format!(
                "unsupported document version {}",
                doc.version
            )));
        }
        Ok(doc)
    }

    pub fn address(&self) -> Result<Ipv6Addr> {
        self.address
            .parse()
            .map_err(|e| CgaError::InvalidParameters(format!("invalid address: {e}")))
    }

    /// Decode the parameter set.
    pub fn params(&self) -> Result<CgaParams> {
        let modifier = Modifier::from_base64(&self.modifier)
            .map_err(|e| CgaError::InvalidParameters(e.to_string()))?;
        let prefix: SubnetPrefix = self
            .prefix
            .parse()
            .map_err(|e: CgaError| CgaError::InvalidParameters(e.to_string()))?;
        let collision_count = CollisionCount::new(self.collision_count)
            .map_err(|e| CgaError::InvalidParameters(e.to_string()))?;
        let public_key = b64_decode("public_key", &self.public_key)?;
        if public_key.is_empty() {
            return Err(CgaError::InvalidParameters("public key is empty".into()));
        }
        let extensions = self
            .extensions
            .iter()
            .map(|e| b64_decode("extensions", e))
            .collect::<Result<Vec<_>>>()?;

        Ok(CgaParams {
            modifier,
            prefix,
            collision_count,
            public_key,
            extensions,
        })
    }
}
