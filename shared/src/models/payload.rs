//! Payload records logged against the monitored deployment

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of payload records fetched per run
pub const PAYLOAD_RECORD_LIMIT: u32 = 500;

/// Output column every row carries
pub const GENERATED_TEXT_FIELD: &str = "generated_text";

/// One payload record reduced to the prompt fields and the generated text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadRow {
    pub values: Map<String, Value>,
}

impl PayloadRow {
    /// Keep only the requested fields that are present in `entity.values`
    pub fn from_record(record: &Value, fields: &[String]) -> Self {
        let source = record.pointer("/entity/values").and_then(Value::as_object);

        let mut values = Map::new();
        if let Some(source) = source {
            for field in fields {
                if let Some(value) = source.get(field) {
                    values.insert(field.clone(), value.clone());
                }
            }
        }

        let generated = source
            .and_then(|s| s.get(GENERATED_TEXT_FIELD))
            .cloned()
            .unwrap_or(Value::Null);
        values.insert(GENERATED_TEXT_FIELD.to_string(), generated);

        Self { values }
    }

    pub fn generated_text(&self) -> Option<&str> {
        self.values.get(GENERATED_TEXT_FIELD).and_then(Value::as_str)
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }
}

/// Convert a records page into rows
pub fn rows_from_records(page: &Value, fields: &[String]) -> Vec<PayloadRow> {
    page.get("records")
        .and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .map(|record| PayloadRow::from_record(record, fields))
                .collect()
        })
        .unwrap_or_default()
}
