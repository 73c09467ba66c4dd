//! Protobuf messages accepted by the alkanes `metashrew_view` functions
//!
//! Only the request side is modelled; responses are handed back to the
//! caller untouched.

use prost::Message;

/// `message Outpoint { bytes txid = 1; uint32 vout = 2; }`
#[derive(Clone, PartialEq, Message)]
pub struct OutpointRequest {
    /// Txid in wire (little-endian) order
    #[prost(bytes = "vec", tag = "1")]
    pub txid: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub vout: u32,
}

/// `message TraceBlockRequest { uint64 block = 1; }`
#[derive(Clone, PartialEq, Message)]
pub struct TraceBlockRequest {
    #[prost(uint64, tag = "1")]
    pub block: u64,
}

/// Hex encode a message with the `0x` prefix `metashrew_view` expects
pub fn to_view_input<M: Message>(message: &M) -> String {
    format!("0x{}", hex::encode(message.encode_to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_block_request_encoding() {
        let request = TraceBlockRequest { block: 880_000 };
        // field 1, varint: 0x08 then LEB128(880000)
        assert_eq!(hex::encode(request.encode_to_vec()), "0880db35");
        assert_eq!(to_view_input(&request), "0x0880db35");
    }

    #[test]
    fn test_outpoint_request_layout() {
        let request = OutpointRequest {
            txid: vec![0xab; 32],
            vout: 3,
        };
        let bytes = request.encode_to_vec();
        assert_eq!(bytes.len(), 2 + 32 + 2);
        assert_eq!(&bytes[..2], &[0x0a, 0x20]);
        assert_eq!(&bytes[34..], &[0x10, 0x03]);
    }
}
