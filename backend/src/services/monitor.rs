//! Monitor service
//!
//! Reads subscription and payload data for a custom monitor run and publishes
//! the resulting metrics back to OpenScale.

use std::sync::Arc;

use shared::{last_finished_run_date, rows_from_records, MetricSummary, PayloadRow, PromptFields};

use crate::error::{AppError, AppResult};
use crate::external::MonitoringApi;

/// Service for OpenScale monitor operations
#[derive(Clone)]
pub struct MonitorService {
    api: Arc<dyn MonitoringApi>,
    payload_limit: u32,
}

impl MonitorService {
    pub fn new(api: Arc<dyn MonitoringApi>, payload_limit: u32) -> Self {
        Self { api, payload_limit }
    }

    /// Prompt fields of the monitored subscription
    pub async fn extract_prompt_fields(&self, subscription_id: &str) -> AppResult<PromptFields> {
        let subscription = self.api.get_subscription(subscription_id).await?;

        PromptFields::from_subscription(&subscription).map_err(|e| {
            tracing::error!(
                "Invalid subscription payload structure for subscription_id={}",
                subscription_id
            );
            e.into()
        })
    }

    /// Creation date of the last finished run; lookup failures count as no run
    pub async fn get_last_run_date(&self, monitor_instance_id: &str) -> Option<String> {
        match self.api.list_runs(monitor_instance_id).await {
            Ok(runs) => last_finished_run_date(&runs),
            Err(e) => {
                tracing::warn!(
                    "Could not list runs for monitor_instance_id={}: {}",
                    monitor_instance_id,
                    e
                );
                None
            }
        }
    }

    /// Payload rows logged since the last finished run
    pub async fn get_payload_data(
        &self,
        payload_dataset_id: &str,
        monitor_instance_id: &str,
        prompt_fields: &PromptFields,
    ) -> AppResult<Vec<PayloadRow>> {
        let start_date = self.get_last_run_date(monitor_instance_id).await;

        tracing::info!("Payload Dataset ID: {}", payload_dataset_id);
        tracing::info!(
            "Fetching payload data greater than or equal to: {}",
            start_date.as_deref().unwrap_or("None")
        );

        let page = self
            .api
            .get_records(payload_dataset_id, start_date.as_deref(), self.payload_limit)
            .await?;

        let rows = rows_from_records(&page, &prompt_fields.fields);
        tracing::info!("Number of records in payload data: {}", rows.len());

        Ok(rows)
    }

    /// Publish metric means for a run
    pub async fn store_metrics(
        &self,
        monitor_instance_id: &str,
        run_id: &str,
        summary: &MetricSummary,
    ) -> AppResult<()> {
        self.api
            .store_measurement(monitor_instance_id, run_id, summary)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to store metrics for monitor_instance_id={}, run_id={}",
                    monitor_instance_id,
                    run_id
                );
                AppError::MetricStorage(e.to_string())
            })
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeMonitoringApi;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_payload_starts_at_last_finished_run() {
        let api = Arc::new(FakeMonitoringApi::rag());
        let service = MonitorService::new(api.clone(), 500);

        let fields = service.extract_prompt_fields("sub").await.unwrap();
        let rows = service.get_payload_data("ds", "mon", &fields).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_text("context"), Some("Paris is the capital of France."));

        let queries = api.record_queries.lock().unwrap();
        assert_eq!(
            queries[0],
            ("ds".to_string(), Some("2024-01-01T00:00:00Z".to_string()), 500)
        );
    }

    #[tokio::test]
    async fn test_run_lookup_failure_fetches_from_beginning() {
        let api = Arc::new(FakeMonitoringApi {
            runs: None,
            ..FakeMonitoringApi::rag()
        });
        let service = MonitorService::new(api.clone(), 10);

        assert_eq!(service.get_last_run_date("mon").await, None);

        let fields = service.extract_prompt_fields("sub").await.unwrap();
        service.get_payload_data("ds", "mon", &fields).await.unwrap();
        assert_eq!(api.record_queries.lock().unwrap()[0].1, None);
    }

    #[tokio::test]
    async fn test_invalid_subscription() {
        let api = Arc::new(FakeMonitoringApi {
            subscription: json!({ "errors": [] }),
            ..FakeMonitoringApi::rag()
        });
        let service = MonitorService::new(api, 500);

        let err = service.extract_prompt_fields("sub").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSubscription));
    }

    #[tokio::test]
    async fn test_storage_failure_is_wrapped() {
        let api = Arc::new(FakeMonitoringApi {
            fail_storage: true,
            ..FakeMonitoringApi::rag()
        });
        let service = MonitorService::new(api, 500);

        let err = service
            .store_metrics("mon", "run", &MetricSummary::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MetricStorage(_)));
    }
}
