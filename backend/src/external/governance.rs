//! watsonx.governance evaluator client
//!
//! Model-based metrics (answer relevance, social bias, jailbreak) are scored by
//! a remote evaluation endpoint; this client posts the payload rows and reads
//! back per-record metric values.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{MetricKind, MetricRecord, PayloadRow, GENERATED_TEXT_FIELD};

use super::iam::IamAuthenticator;
use crate::error::{AppError, AppResult};

/// Column layout and metrics for one evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest<'a> {
    pub input_fields: &'a [String],
    pub context_fields: &'a [String],
    pub output_fields: Vec<&'static str>,
    pub reference_fields: Vec<String>,
    pub metrics: Vec<MetricKind>,
    pub records: &'a [PayloadRow],
}

impl<'a> EvaluationRequest<'a> {
    pub fn new(
        input_fields: &'a [String],
        context_fields: &'a [String],
        metrics: Vec<MetricKind>,
        records: &'a [PayloadRow],
    ) -> Self {
        Self {
            input_fields,
            context_fields,
            output_fields: vec![GENERATED_TEXT_FIELD],
            reference_fields: Vec::new(),
            metrics,
            records,
        }
    }
}

/// Per-record results from the evaluator
#[derive(Debug, Deserialize)]
pub struct EvaluationResponse {
    #[serde(default)]
    pub metrics: Vec<MetricRecord>,
}

/// Remote scorer for metrics that need a model
#[async_trait]
pub trait RemoteEvaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> AppResult<Vec<MetricRecord>>;
}

/// Client for the governance evaluation endpoint
#[derive(Clone)]
pub struct GovernanceClient {
    http_client: Client,
    auth: IamAuthenticator,
    endpoint: String,
}

impl GovernanceClient {
    pub fn new(http_client: Client, auth: IamAuthenticator, endpoint: String) -> Self {
        Self {
            http_client,
            auth,
            endpoint,
        }
    }
}

#[async_trait]
impl RemoteEvaluator for GovernanceClient {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> AppResult<Vec<MetricRecord>> {
        let token = self.auth.bearer_token().await?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Governance(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Governance(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: EvaluationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Governance(format!("Failed to parse response: {}", e)))?;

        Ok(result.metrics)
    }
}
