//! Outpoint encoders
//!
//! The indexer has accepted outpoints in more than one shape over time and
//! the live service does not document which one it wants, so every known
//! shape is kept here behind one trait:
//!
//! - `json`: compact `{"txid":..,"vout":..}` text, hex encoded
//! - `binary`: 32-byte little-endian txid + 4-byte little-endian vout
//! - `protobuf`: the alkanes `Outpoint` message
//! - `display`: the plain `txid:vout` string
//!
//! Encoders are write-only.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::ShrewError;
use crate::outpoint::Outpoint;
use crate::proto::OutpointRequest;

/// Turns an outpoint into the bytes a remote method expects
pub trait OutpointEncoder {
    /// Short name used in logs and probe reports
    fn name(&self) -> &'static str;

    /// Raw encoded bytes
    fn encode(&self, outpoint: &Outpoint) -> Vec<u8>;

    /// Lowercase hex of [`OutpointEncoder::encode`], without a prefix
    fn encode_hex(&self, outpoint: &Outpoint) -> String {
        hex::encode(self.encode(outpoint))
    }

    /// The string form sent as an RPC parameter
    fn wire_form(&self, outpoint: &Outpoint) -> String {
        self.encode_hex(outpoint)
    }

    /// `0x`-prefixed input for a `metashrew_view` call
    fn view_input(&self, outpoint: &Outpoint) -> String {
        format!("0x{}", self.encode_hex(outpoint))
    }
}

/// The known outpoint encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutpointEncoding {
    /// Compact JSON text, hex encoded
    Json,
    /// Reversed txid followed by little-endian vout
    Binary,
    /// Alkanes `Outpoint` protobuf message
    Protobuf,
    /// `txid:vout`, sent unencoded
    Display,
}

impl OutpointEncoding {
    pub const ALL: [OutpointEncoding; 4] = [
        OutpointEncoding::Json,
        OutpointEncoding::Binary,
        OutpointEncoding::Protobuf,
        OutpointEncoding::Display,
    ];
}

impl OutpointEncoder for OutpointEncoding {
    fn name(&self) -> &'static str {
        match self {
            OutpointEncoding::Json => "json",
            OutpointEncoding::Binary => "binary",
            OutpointEncoding::Protobuf => "protobuf",
            OutpointEncoding::Display => "display",
        }
    }

    fn encode(&self, outpoint: &Outpoint) -> Vec<u8> {
        match self {
            OutpointEncoding::Json => json!({
                "txid": outpoint.txid_hex(),
                "vout": outpoint.vout(),
            })
            .to_string()
            .into_bytes(),
            OutpointEncoding::Binary => {
                let mut bytes = Vec::with_capacity(36);
                bytes.extend_from_slice(&outpoint.wire_txid_bytes());
                bytes.extend_from_slice(&outpoint.vout().to_le_bytes());
                bytes
            }
            OutpointEncoding::Protobuf => OutpointRequest {
                txid: outpoint.wire_txid_bytes().to_vec(),
                vout: outpoint.vout(),
            }
            .encode_to_vec(),
            OutpointEncoding::Display => outpoint.to_string().into_bytes(),
        }
    }

    fn wire_form(&self, outpoint: &Outpoint) -> String {
        match self {
            OutpointEncoding::Display => outpoint.to_string(),
            _ => self.encode_hex(outpoint),
        }
    }

    fn view_input(&self, outpoint: &Outpoint) -> String {
        match self {
            OutpointEncoding::Display => outpoint.to_string(),
            _ => format!("0x{}", self.encode_hex(outpoint)),
        }
    }
}

impl fmt::Display for OutpointEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutpointEncoding {
    type Err = ShrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "json-hex" => Ok(OutpointEncoding::Json),
            "binary" | "bin" => Ok(OutpointEncoding::Binary),
            "protobuf" | "proto" => Ok(OutpointEncoding::Protobuf),
            "display" | "raw" => Ok(OutpointEncoding::Display),
            other => Err(ShrewError::Config(format!(
                "unknown outpoint encoding '{}', expected one of json, binary, protobuf, display",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outpoint::reverse_hex;

    const TXID: &str = "9a222f0e9e176e5a70c95dbbe59afce6607bb5a50c7ef96ea91fa49f8f14525e";

    fn outpoint(vout: u32) -> Outpoint {
        Outpoint::from_parts(TXID, vout).unwrap()
    }

    #[test]
    fn test_json_encoding_is_compact() {
        let encoded = OutpointEncoding::Json.encode(&outpoint(1));
        assert_eq!(
            String::from_utf8(encoded).unwrap(),
            format!("{{\"txid\":\"{}\",\"vout\":1}}", TXID)
        );
        assert_eq!(
            OutpointEncoding::Json.encode_hex(&outpoint(1)),
            "7b2274786964223a2239613232326630653965313736653561373063393564626265353961666365363630376262356135306337656639366561393166613439663866313435323565222c22766f7574223a317d"
        );
    }

    #[test]
    fn test_binary_encoding() {
        let hex = OutpointEncoding::Binary.encode_hex(&outpoint(1));
        assert_eq!(
            hex,
            "5e52148f9fa41fa96ef97e0ca5b57b60e6fc9ae5bb5dc9705a6e179e0e2f229a01000000"
        );
        assert_eq!(OutpointEncoding::Binary.encode(&outpoint(1)).len(), 36);
    }

    #[test]
    fn test_binary_txid_segment_round_trips() {
        let bytes = OutpointEncoding::Binary.encode(&outpoint(42));
        let segment = hex::encode(&bytes[..32]);
        assert_eq!(reverse_hex(&segment).unwrap(), TXID);
        assert_eq!(reverse_hex(&reverse_hex(&segment).unwrap()).unwrap(), segment);
        assert_eq!(&bytes[32..], &42u32.to_le_bytes());
    }

    #[test]
    fn test_binary_matches_consensus_serialization() {
        let btc: bitcoin::OutPoint = outpoint(9).into();
        assert_eq!(
            OutpointEncoding::Binary.encode(&outpoint(9)),
            bitcoin::consensus::serialize(&btc)
        );
    }

    #[test]
    fn test_protobuf_encoding() {
        assert_eq!(
            OutpointEncoding::Protobuf.view_input(&outpoint(1)),
            "0x0a205e52148f9fa41fa96ef97e0ca5b57b60e6fc9ae5bb5dc9705a6e179e0e2f229a1001"
        );
        // proto3 omits a zero vout
        assert_eq!(OutpointEncoding::Protobuf.encode(&outpoint(0)).len(), 34);
    }

    #[test]
    fn test_display_encoding_is_not_hexed() {
        let op = outpoint(3);
        assert_eq!(OutpointEncoding::Display.wire_form(&op), format!("{}:3", TXID));
        assert_eq!(OutpointEncoding::Display.view_input(&op), format!("{}:3", TXID));
        assert_eq!(
            OutpointEncoding::Display.encode_hex(&op),
            hex::encode(format!("{}:3", TXID))
        );
    }

    #[test]
    fn test_parse_encoding_names() {
        for encoding in OutpointEncoding::ALL {
            assert_eq!(encoding.name().parse::<OutpointEncoding>().unwrap(), encoding);
        }
        assert_eq!("PROTO".parse::<OutpointEncoding>().unwrap(), OutpointEncoding::Protobuf);
        assert!("base64".parse::<OutpointEncoding>().is_err());
    }
}
