//! Measurement documents published for a monitor run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::metrics::MetricSummary;
use super::run::FINISHED_STATE;

/// Measurement payload accepted by the monitor instance measurements endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub metrics: Vec<MetricSummary>,
}

impl Measurement {
    pub fn new(run_id: impl Into<String>, summary: MetricSummary, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            run_id: run_id.into(),
            metrics: vec![summary],
        }
    }
}

/// JSON patch marking a run as finished
///
/// Only `state` and `completed_at` are replaced so the rest of the run status
/// (start time, failure details) is kept.
pub fn finished_run_patch(completed_at: DateTime<Utc>) -> Value {
    json!([
        {
            "op": "replace",
            "path": "/status/state",
            "value": FINISHED_STATE
        },
        {
            "op": "replace",
            "path": "/status/completed_at",
            "value": completed_at
        }
    ])
}
