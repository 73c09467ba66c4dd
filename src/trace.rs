//! Trace results
//!
//! The indexer answers "nothing traced for this outpoint" with an empty
//! value rather than an error. [`TraceOutcome`] keeps that distinction
//! explicit so callers never mistake it for a failure or for data.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// What a trace query produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "trace", rename_all = "lowercase")]
pub enum TraceOutcome {
    /// The call succeeded but there is no trace data
    Empty,
    Data(Value),
}

impl TraceOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, TraceOutcome::Empty)
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            TraceOutcome::Empty => None,
            TraceOutcome::Data(value) => Some(value),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            TraceOutcome::Empty => Value::Null,
            TraceOutcome::Data(value) => value,
        }
    }
}

impl From<Value> for TraceOutcome {
    fn from(value: Value) -> Self {
        if is_empty_result(&value) {
            TraceOutcome::Empty
        } else {
            TraceOutcome::Data(value)
        }
    }
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceOutcome::Empty => write!(f, "no trace data"),
            TraceOutcome::Data(Value::Array(items)) => write!(f, "{} trace entries", items.len()),
            TraceOutcome::Data(Value::String(s)) => write!(f, "{} chars of trace data", s.len()),
            TraceOutcome::Data(_) => write!(f, "trace data"),
        }
    }
}

/// `null`, `[]`, `{}`, `""` and `"0x"` all mean "no data"
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s == "0x"
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_results() {
        for value in [json!(null), json!([]), json!({}), json!(""), json!("0x")] {
            assert!(is_empty_result(&value), "{} should be empty", value);
            assert_eq!(TraceOutcome::from(value), TraceOutcome::Empty);
        }
    }

    #[test]
    fn test_data_results() {
        for value in [json!([{"event": "invoke"}]), json!("0x0a00"), json!(0), json!(false)] {
            assert!(!is_empty_result(&value), "{} should be data", value);
        }
        let outcome = TraceOutcome::from(json!([1, 2]));
        assert_eq!(outcome.data(), Some(&json!([1, 2])));
        assert_eq!(outcome.to_string(), "2 trace entries");
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_value(TraceOutcome::Empty).unwrap(), json!({"status": "empty"}));
        assert_eq!(
            serde_json::to_value(TraceOutcome::Data(json!([1]))).unwrap(),
            json!({"status": "data", "trace": [1]})
        );
    }
}
