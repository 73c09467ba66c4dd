//! Shrewtrace Library
//!
//! A client for the Metashrew/Sandshrew indexer JSON-RPC gateway, focused on
//! fetching alkanes transaction and block traces.
//!
//! The library is organized into several key modules:
//! - `outpoint`: the outpoint value type and txid byte-order helpers
//! - `codec`: the outpoint encodings the indexer has accepted over time
//! - `rpc`: JSON-RPC envelope, HTTP client, typed methods and multicall
//! - `probe`: ordered fallback over trace request shapes
//! - `trace`: empty-versus-data classification of trace results
//! - `config`: endpoint aliases and configuration resolution
//! - `dump`: JSON dumps of results for debugging

pub mod codec;
pub mod config;
pub mod dump;
pub mod error;
pub mod outpoint;
pub mod probe;
pub mod proto;
pub mod rpc;
pub mod trace;

pub use codec::{OutpointEncoder, OutpointEncoding};
pub use config::ClientConfig;
pub use error::{Result, ShrewError};
pub use outpoint::{reverse_hex, Outpoint};
pub use probe::{ProbeReport, TraceProbe};
pub use rpc::methods::TraceStrategy;
pub use rpc::{IndexerMethods, JsonRpcCaller, Multicall, RpcClient};
pub use trace::TraceOutcome;
