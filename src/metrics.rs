//! Graphite plaintext metrics
//!
//! Metric plugins print one line per data point in the form
//! `path value timestamp`, which the agent forwards to Graphite untouched.

use std::fmt;

use chrono::Utc;
use serde_json::Value;

/// A single line of Graphite plaintext output
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub path: String,
    pub value: String,
    pub timestamp: i64,
}

impl Metric {
    pub fn new<P: Into<String>, V: Into<String>>(path: P, value: V, timestamp: i64) -> Metric {
        Metric {
            path: path.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// Build a metric from a JSON scalar
    ///
    /// Numbers keep the text serde_json gives them (`12.5`, `1024`), strings
    /// and booleans are written bare. `None` for null, arrays and objects,
    /// which have no plaintext form.
    pub fn from_json<P: Into<String>>(path: P, value: &Value, timestamp: i64) -> Option<Metric> {
        let rendered = match *value {
            Value::Number(ref n) => n.to_string(),
            Value::String(ref s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        Some(Metric::new(path, rendered, timestamp))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.value, self.timestamp)
    }
}

/// Seconds since the epoch, taken once per run so every line shares it
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
