//! `sandshrew_multicall` batching
//!
//! A batch of `(method, params)` pairs travels as a single request whose
//! params are `[[[method, params], ...]]`. The gateway answers with one entry
//! per call, in the same order, each shaped `{"result": ..}` or
//! `{"error": ..}`.

use serde_json::{json, Value};

use super::remote_error_from_value;
use crate::error::{Result, ShrewError};

pub const MULTICALL_METHOD: &str = "sandshrew_multicall";

/// An ordered batch of RPC calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multicall {
    calls: Vec<(String, Vec<Value>)>,
}

impl Multicall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call; returns its index in the batch
    pub fn push(&mut self, method: &str, params: Vec<Value>) -> usize {
        self.calls.push((method.to_string(), params));
        self.calls.len() - 1
    }

    /// Builder-style [`Multicall::push`]
    pub fn with(mut self, method: &str, params: Vec<Value>) -> Self {
        self.push(method, params);
        self
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().map(|(method, _)| method.as_str())
    }

    /// The `params` member of the batch request
    pub fn params(&self) -> Vec<Value> {
        let calls: Vec<Value> = self
            .calls
            .iter()
            .map(|(method, params)| json!([method, params]))
            .collect();
        vec![Value::Array(calls)]
    }

    /// Split an aggregate result into per-call outcomes, in input order
    ///
    /// A per-call `error` becomes that entry's `Err`; it does not fail the
    /// batch. A length mismatch does.
    pub fn split(&self, response: Value) -> Result<Vec<Result<Value>>> {
        let entries = match response {
            Value::Array(entries) => entries,
            other => {
                return Err(ShrewError::InvalidResponse(format!(
                    "multicall result must be an array, got {}",
                    other
                )))
            }
        };

        if entries.len() != self.calls.len() {
            return Err(ShrewError::InvalidResponse(format!(
                "multicall returned {} results for {} calls",
                entries.len(),
                self.calls.len()
            )));
        }

        Ok(entries.into_iter().map(split_entry).collect())
    }
}

fn split_entry(entry: Value) -> Result<Value> {
    match entry {
        Value::Object(mut map) if map.contains_key("result") || map.contains_key("error") => {
            match map.remove("error") {
                Some(error) if !error.is_null() => Err(remote_error_from_value(&error)),
                _ => Ok(map.remove("result").unwrap_or(Value::Null)),
            }
        }
        // bare values from gateways that skip the wrapper
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_shape() {
        let batch = Multicall::new()
            .with("metashrew_height", vec![])
            .with("getblockhash", vec![json!(840000)]);

        assert_eq!(
            Value::Array(batch.params()),
            json!([[["metashrew_height", []], ["getblockhash", [840000]]]])
        );
        assert_eq!(batch.methods().collect::<Vec<_>>(), vec!["metashrew_height", "getblockhash"]);
    }

    #[test]
    fn test_split_preserves_order_and_errors() {
        let batch = Multicall::new()
            .with("metashrew_height", vec![])
            .with("alkanes_trace", vec![json!("bad")])
            .with("alkanes_trace", vec![json!("good")]);

        let outcomes = batch
            .split(json!([
                {"result": 880000},
                {"error": {"code": -1, "message": "invalid outpoint"}},
                {"result": []}
            ]))
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap(), &json!(880000));
        assert_eq!(
            outcomes[1].as_ref().unwrap_err().to_string(),
            "RPC error: invalid outpoint (code: -1)"
        );
        assert_eq!(outcomes[2].as_ref().unwrap(), &json!([]));
    }

    #[test]
    fn test_split_bare_values() {
        let batch = Multicall::new().with("a", vec![]).with("b", vec![]);
        let outcomes = batch.split(json!([1, null])).unwrap();
        assert_eq!(outcomes[0].as_ref().unwrap(), &json!(1));
        assert_eq!(outcomes[1].as_ref().unwrap(), &Value::Null);
    }

    #[test]
    fn test_split_length_mismatch() {
        let batch = Multicall::new().with("a", vec![]).with("b", vec![]);
        assert!(matches!(
            batch.split(json!([{"result": 1}])),
            Err(ShrewError::InvalidResponse(_))
        ));
        assert!(matches!(
            batch.split(json!({"result": 1})),
            Err(ShrewError::InvalidResponse(_))
        ));
    }
}
