//! Typed wrappers for the methods the indexer gateway recognizes

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::multicall::{Multicall, MULTICALL_METHOD};
use super::JsonRpcCaller;
use crate::codec::{OutpointEncoder, OutpointEncoding};
use crate::error::{Result, ShrewError};
use crate::outpoint::Outpoint;
use crate::proto::{self, TraceBlockRequest};
use crate::trace::TraceOutcome;

pub const ALKANES_TRACE: &str = "alkanes_trace";
pub const ALKANES_TRACEBLOCK: &str = "alkanes_traceblock";
pub const METASHREW_VIEW: &str = "metashrew_view";
pub const METASHREW_HEIGHT: &str = "metashrew_height";
pub const BTC_GETBLOCKCOUNT: &str = "btc_getblockcount";
pub const GETBLOCKHASH: &str = "getblockhash";
pub const GETBLOCK: &str = "getblock";
pub const GETRAWTRANSACTION: &str = "getrawtransaction";

/// Block tag for views evaluated at the indexer tip
pub const LATEST: &str = "latest";

/// One way of asking the indexer for an outpoint's trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "encoding", rename_all = "lowercase")]
pub enum TraceStrategy {
    /// `alkanes_trace [{"txid": <wire-order hex>, "vout": n}]`
    Object,
    /// `alkanes_trace [<encoded outpoint>]`
    Param(OutpointEncoding),
    /// `metashrew_view ["trace", <0x-encoded outpoint>, "latest"]`
    View(OutpointEncoding),
}

impl TraceStrategy {
    pub fn method(&self) -> &'static str {
        match self {
            TraceStrategy::Object | TraceStrategy::Param(_) => ALKANES_TRACE,
            TraceStrategy::View(_) => METASHREW_VIEW,
        }
    }

    pub fn params(&self, outpoint: &Outpoint) -> Vec<Value> {
        match self {
            TraceStrategy::Object => vec![json!({
                "txid": outpoint.wire_txid_hex(),
                "vout": outpoint.vout(),
            })],
            TraceStrategy::Param(encoding) => vec![json!(encoding.wire_form(outpoint))],
            TraceStrategy::View(encoding) => vec![
                json!("trace"),
                json!(encoding.view_input(outpoint)),
                json!(LATEST),
            ],
        }
    }
}

impl fmt::Display for TraceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStrategy::Object => write!(f, "{}/object", ALKANES_TRACE),
            TraceStrategy::Param(encoding) => write!(f, "{}/{}", ALKANES_TRACE, encoding),
            TraceStrategy::View(encoding) => write!(f, "{}:trace/{}", METASHREW_VIEW, encoding),
        }
    }
}

impl FromStr for TraceStrategy {
    type Err = ShrewError;

    /// `object`, `param:<encoding>` or `view:<encoding>`
    fn from_str(s: &str) -> Result<Self> {
        let (kind, encoding) = match s.split_once(':') {
            Some((kind, encoding)) => (kind, Some(encoding)),
            None => (s, None),
        };
        match (kind.to_ascii_lowercase().as_str(), encoding) {
            ("object", None) => Ok(TraceStrategy::Object),
            ("param", Some(encoding)) => Ok(TraceStrategy::Param(encoding.parse()?)),
            ("view", Some(encoding)) => Ok(TraceStrategy::View(encoding.parse()?)),
            _ => Err(ShrewError::Config(format!(
                "unknown trace strategy '{}', expected object, param:<encoding> or view:<encoding>",
                s
            ))),
        }
    }
}

/// Read a height that may arrive as a number or a decimal string
pub fn value_as_u64(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ShrewError::InvalidResponse(format!("invalid height: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| ShrewError::InvalidResponse(format!("invalid height '{}': {}", s, e))),
        other => Err(ShrewError::InvalidResponse(format!("invalid height: {}", other))),
    }
}

/// Indexer and bitcoind methods, available on every [`JsonRpcCaller`]
#[async_trait]
pub trait IndexerMethods: JsonRpcCaller {
    /// Get the indexer's current height
    async fn metashrew_height(&self) -> Result<u64> {
        let result = self.call(METASHREW_HEIGHT, vec![]).await?;
        let height = value_as_u64(&result)?;
        debug!("Current Metashrew height: {}", height);
        Ok(height)
    }

    /// Get bitcoind's block count through the gateway
    async fn btc_getblockcount(&self) -> Result<u64> {
        let result = self.call(BTC_GETBLOCKCOUNT, vec![]).await?;
        value_as_u64(&result)
    }

    async fn getblockhash(&self, height: u64) -> Result<String> {
        let result = self.call(GETBLOCKHASH, vec![json!(height)]).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ShrewError::InvalidResponse(format!("invalid block hash: {}", result)))
    }

    /// `verbosity` follows bitcoind: 0 raw hex, 1 json, 2 json with transactions
    async fn getblock(&self, hash: &str, verbosity: u8) -> Result<Value> {
        self.call(GETBLOCK, vec![json!(hash), json!(verbosity)]).await
    }

    async fn getrawtransaction(&self, txid: &str, verbose: bool) -> Result<Value> {
        self.call(GETRAWTRANSACTION, vec![json!(txid), json!(verbose)]).await
    }

    /// Evaluate a named view function
    async fn metashrew_view(&self, view: &str, input: &str, block_tag: &str) -> Result<Value> {
        debug!("Calling view {} with input {}", view, input);
        self.call(METASHREW_VIEW, vec![json!(view), json!(input), json!(block_tag)])
            .await
    }

    async fn alkanes_trace(&self, params: Vec<Value>) -> Result<Value> {
        self.call(ALKANES_TRACE, params).await
    }

    async fn alkanes_traceblock(&self, height: u64) -> Result<TraceOutcome> {
        let result = self.call(ALKANES_TRACEBLOCK, vec![json!(height)]).await?;
        Ok(TraceOutcome::from(result))
    }

    /// Trace a block through the `traceblock` view
    async fn trace_block_view(&self, height: u64) -> Result<TraceOutcome> {
        let input = proto::to_view_input(&TraceBlockRequest { block: height });
        let result = self.metashrew_view("traceblock", &input, LATEST).await?;
        Ok(TraceOutcome::from(result))
    }

    /// Trace an outpoint with one strategy
    async fn trace_outpoint(&self, outpoint: &Outpoint, strategy: TraceStrategy) -> Result<TraceOutcome> {
        debug!("Tracing {} via {}", outpoint, strategy);
        let result = self.call(strategy.method(), strategy.params(outpoint)).await?;
        Ok(TraceOutcome::from(result))
    }

    /// Send a batch as one `sandshrew_multicall` request
    async fn multicall(&self, batch: &Multicall) -> Result<Vec<Result<Value>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Sending multicall with {} calls", batch.len());
        let result = self.call(MULTICALL_METHOD, batch.params()).await?;
        batch.split(result)
    }
}

impl<T: JsonRpcCaller + ?Sized> IndexerMethods for T {}
