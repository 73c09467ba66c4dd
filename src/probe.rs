//! Ordered fallback probe
//!
//! Which request shape a given indexer deployment accepts for traces is not
//! documented and has changed between versions. [`TraceProbe`] walks a
//! priority list of [`TraceStrategy`] values, stops at the first one that
//! returns data and records what every attempt did on the way.

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::codec::OutpointEncoding;
use crate::error::Result;
use crate::outpoint::Outpoint;
use crate::rpc::methods::TraceStrategy;
use crate::rpc::{IndexerMethods, JsonRpcCaller};
use crate::trace::TraceOutcome;

/// The strategies tried when none are given, most likely first
pub const DEFAULT_STRATEGIES: [TraceStrategy; 6] = [
    TraceStrategy::Object,
    TraceStrategy::View(OutpointEncoding::Protobuf),
    TraceStrategy::View(OutpointEncoding::Binary),
    TraceStrategy::View(OutpointEncoding::Json),
    TraceStrategy::Param(OutpointEncoding::Display),
    TraceStrategy::Param(OutpointEncoding::Json),
];

/// Result of a single strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum AttemptOutcome {
    Found,
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeAttempt {
    pub strategy: TraceStrategy,
    pub label: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Everything a probe run observed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub outpoint: String,
    pub attempts: Vec<ProbeAttempt>,
    /// The first strategy that returned data
    pub winner: Option<TraceStrategy>,
    pub trace: Option<Value>,
}

impl ProbeReport {
    pub fn found(&self) -> bool {
        self.winner.is_some()
    }

    /// True when every strategy failed outright, none even came back empty
    pub fn all_failed(&self) -> bool {
        !self.attempts.is_empty()
            && self
                .attempts
                .iter()
                .all(|a| matches!(a.outcome, AttemptOutcome::Failed(_)))
    }
}

/// Tries trace strategies in order until one yields data
#[derive(Debug, Clone, PartialEq)]
pub struct TraceProbe {
    strategies: Vec<TraceStrategy>,
}

impl Default for TraceProbe {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGIES.to_vec())
    }
}

impl TraceProbe {
    pub fn new(strategies: Vec<TraceStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[TraceStrategy] {
        &self.strategies
    }

    /// Run the strategies against `caller`
    ///
    /// Errors from individual strategies are recorded, not returned; the
    /// probe itself cannot fail.
    pub async fn run<C>(&self, caller: &C, outpoint: &Outpoint) -> ProbeReport
    where
        C: JsonRpcCaller + ?Sized,
    {
        let mut report = ProbeReport {
            outpoint: outpoint.to_string(),
            attempts: Vec::with_capacity(self.strategies.len()),
            winner: None,
            trace: None,
        };

        for strategy in &self.strategies {
            let result: Result<TraceOutcome> = caller.trace_outpoint(outpoint, *strategy).await;
            let outcome = match result {
                Ok(TraceOutcome::Data(value)) => {
                    info!("{} returned trace data for {}", strategy, outpoint);
                    report.winner = Some(*strategy);
                    report.trace = Some(value);
                    AttemptOutcome::Found
                }
                Ok(TraceOutcome::Empty) => {
                    debug!("{} returned no data for {}", strategy, outpoint);
                    AttemptOutcome::Empty
                }
                Err(e) => {
                    debug!("{} failed for {}: {}", strategy, outpoint, e);
                    AttemptOutcome::Failed(e.to_string())
                }
            };

            let found = outcome == AttemptOutcome::Found;
            report.attempts.push(ProbeAttempt {
                strategy: *strategy,
                label: strategy.to_string(),
                outcome,
            });
            if found {
                break;
            }
        }

        if !report.found() {
            info!(
                "No strategy returned trace data for {} after {} attempts",
                outpoint,
                report.attempts.len()
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShrewError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const TXID: &str = "9a222f0e9e176e5a70c95dbbe59afce6607bb5a50c7ef96ea91fa49f8f14525e";

    /// Answers `alkanes_trace` with an error and `metashrew_view` according
    /// to the encoding prefix it sees
    struct ScriptedIndexer {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonRpcCaller for ScriptedIndexer {
        async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
            self.seen.lock().unwrap().push(method.to_string());
            match method {
                "alkanes_trace" => Err(ShrewError::remote("invalid params", Some(-32602))),
                "metashrew_view" => {
                    let input = params[1].as_str().unwrap_or_default();
                    if input.starts_with("0x0a20") {
                        Ok(json!("0x"))
                    } else {
                        Ok(json!([{"event": "invoke"}]))
                    }
                }
                _ => Ok(Value::Null),
            }
        }
    }

    fn outpoint() -> Outpoint {
        Outpoint::from_parts(TXID, 0).unwrap()
    }

    #[tokio::test]
    async fn test_probe_stops_at_first_data() {
        let indexer = ScriptedIndexer { seen: Mutex::new(Vec::new()) };
        let report = TraceProbe::default().run(&indexer, &outpoint()).await;

        assert!(report.found());
        assert_eq!(report.winner, Some(TraceStrategy::View(OutpointEncoding::Binary)));
        assert_eq!(report.trace, Some(json!([{"event": "invoke"}])));

        let outcomes: Vec<_> = report.attempts.iter().map(|a| a.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                AttemptOutcome::Failed("RPC error: invalid params (code: -32602)".to_string()),
                AttemptOutcome::Empty,
                AttemptOutcome::Found,
            ]
        );
        assert_eq!(indexer.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_probe_without_hit_tries_everything() {
        let indexer = ScriptedIndexer { seen: Mutex::new(Vec::new()) };
        let probe = TraceProbe::new(vec![
            TraceStrategy::Object,
            TraceStrategy::View(OutpointEncoding::Protobuf),
        ]);
        let report = probe.run(&indexer, &outpoint()).await;

        assert!(!report.found());
        assert!(!report.all_failed());
        assert_eq!(report.trace, None);
        assert_eq!(report.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_probe() {
        let indexer = ScriptedIndexer { seen: Mutex::new(Vec::new()) };
        let report = TraceProbe::new(vec![]).run(&indexer, &outpoint()).await;
        assert!(!report.found());
        assert!(!report.all_failed());
        assert!(indexer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_report_serialization() {
        let attempt = ProbeAttempt {
            strategy: TraceStrategy::Object,
            label: TraceStrategy::Object.to_string(),
            outcome: AttemptOutcome::Failed("boom".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&attempt).unwrap(),
            json!({
                "strategy": {"kind": "object"},
                "label": "alkanes_trace/object",
                "outcome": "failed",
                "detail": "boom"
            })
        );
    }
}
