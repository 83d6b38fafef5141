//! Monitor run history

use serde_json::Value;

pub const FINISHED_STATE: &str = "finished";

/// Creation date of the most recent finished run
///
/// OpenScale lists runs newest first, so the first finished entry wins. Returns
/// `None` when the document has no finished runs or is malformed.
pub fn last_finished_run_date(runs: &Value) -> Option<String> {
    runs.get("runs")?
        .as_array()?
        .iter()
        .find(|run| {
            run.pointer("/entity/status/state").and_then(Value::as_str) == Some(FINISHED_STATE)
        })?
        .pointer("/metadata/created_at")
        .and_then(Value::as_str)
        .filter(|date| !date.is_empty())
        .map(str::to_string)
}
