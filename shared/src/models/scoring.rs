//! Scoring request/response envelopes exchanged with OpenScale
//!
//! OpenScale triggers a custom monitor run by posting a scoring-style request
//! to the provider: `{"input_data": [{"values": {...}}]}`. Only the first
//! `input_data` entry is considered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

pub const INPUT_DATA_REQUIRED: &str =
    "'input_data' field is required and must be a non-empty list.";
pub const VALUES_REQUIRED: &str = "'input_data[0].values' must be an object.";

/// Raw scoring request as received from OpenScale
#[derive(Debug, Clone)]
pub struct ScoringRequest {
    body: Value,
}

/// Identifiers of the custom monitor run being computed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorRunContext {
    pub subscription_id: Option<String>,
    pub custom_monitor_instance_id: Option<String>,
    pub payload_dataset_id: Option<String>,
    pub custom_monitor_run_id: Option<String>,
}

impl ScoringRequest {
    /// Parse a request body; anything that is not JSON is rejected
    pub fn from_slice(bytes: &[u8]) -> ModelResult<Self> {
        let body = serde_json::from_slice(bytes).map_err(|_| ModelError::InvalidJson)?;
        Ok(Self { body })
    }

    pub fn from_value(body: Value) -> Self {
        Self { body }
    }

    /// Extract the run identifiers from `input_data[0].values`
    pub fn run_context(&self) -> ModelResult<MonitorRunContext> {
        let first = self
            .body
            .get("input_data")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .ok_or_else(|| ModelError::InvalidRequest(INPUT_DATA_REQUIRED.to_string()))?;

        let values = first
            .get("values")
            .and_then(Value::as_object)
            .ok_or_else(|| ModelError::InvalidRequest(VALUES_REQUIRED.to_string()))?;

        let text = |key: &str| {
            values
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(MonitorRunContext {
            subscription_id: text("subscription_id"),
            custom_monitor_instance_id: text("custom_monitor_instance_id"),
            payload_dataset_id: text("payload_dataset_id"),
            custom_monitor_run_id: text("custom_monitor_run_id"),
        })
    }
}

/// A single prediction row in the scoring response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prediction {
    pub values: Vec<String>,
}

/// Response returned to OpenScale after a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoringResponse {
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ScoringResponse {
    pub fn success() -> Self {
        Self {
            predictions: vec![Prediction {
                values: vec!["success".to_string()],
            }],
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            predictions: Vec::new(),
            errors: Some(vec![message.into()]),
        }
    }
}
