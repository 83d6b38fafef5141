//! Evaluation service
//!
//! Scores payload rows with the configured metrics and averages each metric
//! over the run. Only one evaluation runs at a time.

use std::sync::Arc;

use shared::{calc_mean, readability_records, MetricKind, MetricSummary, PayloadRow, PromptFields};
use tokio::sync::Semaphore;

use crate::error::{AppError, AppResult};
use crate::external::governance::EvaluationRequest;
use crate::external::RemoteEvaluator;

/// Service running metric evaluations on a single worker
#[derive(Clone)]
pub struct EvaluationService {
    remote: Option<Arc<dyn RemoteEvaluator>>,
    worker: Arc<Semaphore>,
}

impl EvaluationService {
    pub fn new(remote: Option<Arc<dyn RemoteEvaluator>>) -> Self {
        Self {
            remote,
            worker: Arc::new(Semaphore::new(1)),
        }
    }

    /// Evaluate the rows and return the mean of every metric
    pub async fn run_evaluator(
        &self,
        rows: Vec<PayloadRow>,
        prompt_fields: &PromptFields,
    ) -> AppResult<MetricSummary> {
        if rows.is_empty() {
            tracing::info!("Input data is empty; skipping evaluation.");
            return Ok(MetricSummary::new());
        }

        let _permit = self
            .worker
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Evaluation worker closed: {}", e)))?;

        tracing::info!("Starting metrics evaluation.");

        let rows = Arc::new(rows);
        let local_rows = Arc::clone(&rows);
        let mut records = tokio::task::spawn_blocking(move || readability_records(&local_rows))
            .await
            .map_err(|e| AppError::Evaluation(format!("Readability scoring panicked: {}", e)))?;

        match &self.remote {
            Some(remote) => {
                let request = EvaluationRequest::new(
                    &prompt_fields.feature_fields,
                    prompt_fields.evaluation_context_fields(),
                    MetricKind::remote().collect(),
                    &rows,
                );
                let remote_records = remote
                    .evaluate(&request)
                    .await
                    .map_err(|e| AppError::Evaluation(e.to_string()))?;
                records.extend(remote_records);
            }
            None => {
                tracing::warn!(
                    "No governance endpoint configured; model-based metrics are skipped."
                );
            }
        }

        if records.is_empty() {
            tracing::warn!("Evaluator returned no metric results.");
            return Ok(MetricSummary::new());
        }

        Ok(calc_mean(&records))
    }
}
