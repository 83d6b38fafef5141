//! HTTP handler for custom metric computation

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{validate_run_context, ScoringRequest, ScoringResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

/// Compute and publish custom metrics for one monitor run
///
/// Request and evaluation failures are returned as `{"detail": ...}` errors.
/// A storage failure is reported in the scoring envelope instead, since the
/// metrics were computed.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn compute_custom_metric(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Response> {
    let request = ScoringRequest::from_slice(&body)?;
    let ctx = request.run_context()?;

    tracing::info!(
        "Processing | subscription_id={} run_id={}",
        ctx.subscription_id.as_deref().unwrap_or("None"),
        ctx.custom_monitor_run_id.as_deref().unwrap_or("None"),
    );

    let ids = validate_run_context(&ctx)?;

    let prepared = async {
        let prompt_fields = state
            .monitor
            .extract_prompt_fields(&ids.subscription_id)
            .await?;
        let rows = state
            .monitor
            .get_payload_data(
                &ids.payload_dataset_id,
                &ids.monitor_instance_id,
                &prompt_fields,
            )
            .await?;
        AppResult::Ok((prompt_fields, rows))
    }
    .await;

    let (prompt_fields, rows) = prepared.map_err(|e| {
        tracing::error!("Failed to prepare evaluation payload.");
        e
    })?;

    let summary = state
        .evaluation
        .run_evaluator(rows, &prompt_fields)
        .await
        .map_err(|e| {
            tracing::error!("Custom evaluator execution failed.");
            e
        })?;

    if let Err(e) = state
        .monitor
        .store_metrics(&ids.monitor_instance_id, &ids.run_id, &summary)
        .await
    {
        tracing::error!("Failed to store metrics: {}", e);
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ScoringResponse::failure(e.to_string())),
        )
            .into_response());
    }

    Ok((StatusCode::OK, Json(ScoringResponse::success())).into_response())
}
