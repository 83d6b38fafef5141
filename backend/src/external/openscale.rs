//! Watson OpenScale REST client
//!
//! Covers the handful of v2 endpoints a custom metric provider needs:
//! subscriptions, monitor runs, payload records and measurements.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use shared::{finished_run_patch, Measurement, MetricSummary};

use super::iam::IamAuthenticator;
use crate::error::{AppError, AppResult};

/// Operations the monitor service performs against OpenScale
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Subscription document for a monitored deployment
    async fn get_subscription(&self, subscription_id: &str) -> AppResult<Value>;

    /// Run history of a monitor instance, newest first
    async fn list_runs(&self, monitor_instance_id: &str) -> AppResult<Value>;

    /// A page of payload records logged at or after `start`
    async fn get_records(
        &self,
        data_set_id: &str,
        start: Option<&str>,
        limit: u32,
    ) -> AppResult<Value>;

    /// Publish the run's metric means and mark the run finished
    async fn store_measurement(
        &self,
        monitor_instance_id: &str,
        run_id: &str,
        summary: &MetricSummary,
    ) -> AppResult<()>;
}

/// OpenScale API client
#[derive(Clone)]
pub struct OpenScaleClient {
    http_client: Client,
    auth: IamAuthenticator,
    base_url: String,
    service_instance_id: String,
}

impl OpenScaleClient {
    pub fn new(
        http_client: Client,
        auth: IamAuthenticator,
        base_url: String,
        service_instance_id: String,
    ) -> Self {
        Self {
            http_client,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_instance_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/openscale/{}/v2/{}",
            self.base_url, self.service_instance_id, path
        )
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<reqwest::Response> {
        let token = self.auth.bearer_token().await?;

        let response = request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::OpenScale(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::OpenScale(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder) -> AppResult<Value> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| AppError::OpenScale(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl MonitoringApi for OpenScaleClient {
    async fn get_subscription(&self, subscription_id: &str) -> AppResult<Value> {
        let url = self.url(&format!("subscriptions/{}", subscription_id));
        self.send_json(self.http_client.get(url)).await
    }

    async fn list_runs(&self, monitor_instance_id: &str) -> AppResult<Value> {
        let url = self.url(&format!("monitor_instances/{}/runs", monitor_instance_id));
        self.send_json(self.http_client.get(url)).await
    }

    async fn get_records(
        &self,
        data_set_id: &str,
        start: Option<&str>,
        limit: u32,
    ) -> AppResult<Value> {
        let url = self.url(&format!("data_sets/{}/records", data_set_id));

        let mut query = vec![("limit", limit.to_string())];
        if let Some(start) = start {
            query.push(("start", start.to_string()));
        }

        self.send_json(self.http_client.get(url).query(&query)).await
    }

    async fn store_measurement(
        &self,
        monitor_instance_id: &str,
        run_id: &str,
        summary: &MetricSummary,
    ) -> AppResult<()> {
        let now = Utc::now();
        let measurement = Measurement::new(run_id, summary.clone(), now);
        let url = self.url(&format!(
            "monitor_instances/{}/measurements",
            monitor_instance_id
        ));
        self.send(self.http_client.post(url).json(&[measurement]))
            .await?;

        let url = self.url(&format!(
            "monitor_instances/{}/runs/{}",
            monitor_instance_id, run_id
        ));
        self.send(self.http_client.patch(url).json(&finished_run_patch(now)))
            .await?;

        tracing::info!(
            "Stored {} metrics for monitor_instance_id={} run_id={}",
            summary.len(),
            monitor_instance_id,
            run_id
        );
        Ok(())
    }
}
