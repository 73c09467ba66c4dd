//! Outpoint value type
//!
//! An outpoint names one output of one transaction. The txid is shown in the
//! usual big-endian "explorer" order and travels little-endian on the wire;
//! `bitcoin::Txid` already keeps both views, so it is the storage type here.

use bitcoin::hashes::Hash;
use bitcoin::Txid;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShrewError};

/// A reference to a specific output of a specific transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outpoint {
    txid: Txid,
    vout: u32,
}

impl Outpoint {
    pub fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// Build an outpoint from a display-order txid hex string and an index
    pub fn from_parts(txid_hex: &str, vout: u32) -> Result<Self> {
        let trimmed = strip_hex_prefix(txid_hex.trim());
        if trimmed.len() != 64 {
            return Err(ShrewError::InvalidOutpoint(format!(
                "txid must be 64 hex characters, got {}",
                trimmed.len()
            )));
        }
        let txid = Txid::from_str(trimmed)
            .map_err(|e| ShrewError::InvalidOutpoint(format!("invalid txid '{}': {}", txid_hex, e)))?;
        Ok(Self::new(txid, vout))
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    /// Txid hex in display (big-endian) order
    pub fn txid_hex(&self) -> String {
        self.txid.to_string()
    }

    /// Txid bytes in wire (little-endian) order
    pub fn wire_txid_bytes(&self) -> [u8; 32] {
        self.txid.to_byte_array()
    }

    /// Txid hex in wire (little-endian) order
    pub fn wire_txid_hex(&self) -> String {
        hex::encode(self.wire_txid_bytes())
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl FromStr for Outpoint {
    type Err = ShrewError;

    /// Parse `<txid>:<vout>`
    fn from_str(s: &str) -> Result<Self> {
        let (txid, vout) = s.trim().rsplit_once(':').ok_or_else(|| {
            ShrewError::InvalidOutpoint(format!("expected '<txid>:<vout>', got '{}'", s))
        })?;
        let vout = vout
            .parse::<u32>()
            .map_err(|e| ShrewError::InvalidOutpoint(format!("invalid vout '{}': {}", vout, e)))?;
        Self::from_parts(txid, vout)
    }
}

impl From<bitcoin::OutPoint> for Outpoint {
    fn from(outpoint: bitcoin::OutPoint) -> Self {
        Self::new(outpoint.txid, outpoint.vout)
    }
}

impl From<Outpoint> for bitcoin::OutPoint {
    fn from(outpoint: Outpoint) -> Self {
        bitcoin::OutPoint::new(outpoint.txid, outpoint.vout)
    }
}

/// Reverse the byte order of a hex string
///
/// `"abcd"` becomes `"cdab"`. An optional `0x` prefix is accepted and dropped.
pub fn reverse_hex(input: &str) -> Result<String> {
    let mut bytes = hex::decode(strip_hex_prefix(input))?;
    bytes.reverse();
    Ok(hex::encode(bytes))
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
