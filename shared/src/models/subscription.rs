//! Prompt field extraction from OpenScale subscriptions

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

pub const RAG_PROBLEM_TYPE: &str = "retrieval_augmented_generation";

/// Problem type of the monitored prompt asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemType {
    Known(String),
    Unspecified,
}

impl ProblemType {
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            Some(v) => ProblemType::Known(v.to_string()),
            None => ProblemType::Unspecified,
        }
    }

    pub fn is_rag(&self) -> bool {
        matches!(self, ProblemType::Known(t) if t == RAG_PROBLEM_TYPE)
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemType::Known(t) => write!(f, "{}", t),
            ProblemType::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Fields of the prompt template that feed the evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFields {
    pub problem_type: ProblemType,
    /// Input variables of the prompt, sorted
    pub feature_fields: Vec<String>,
    /// Retrieved context variables, only populated for RAG prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_fields: Option<Vec<String>>,
    /// Every field to pull from payload records, sorted
    pub fields: Vec<String>,
}

impl PromptFields {
    /// Build the field sets from a subscription document
    ///
    /// For RAG prompts a field listed as both feature and context is treated as
    /// context only.
    pub fn from_subscription(subscription: &Value) -> ModelResult<Self> {
        let entity = subscription
            .get("entity")
            .filter(|e| e.is_object())
            .ok_or(ModelError::InvalidSubscription)?;

        let problem_type = ProblemType::from_option(
            entity
                .get("asset")
                .and_then(|a| a.get("problem_type"))
                .and_then(Value::as_str),
        );
        let asset_props = entity.get("asset_properties");

        let mut feature_fields = string_set(asset_props, "feature_fields");

        if problem_type.is_rag() {
            let context_fields = string_set(asset_props, "context_fields");
            feature_fields.retain(|f| !context_fields.contains(f));

            let fields = feature_fields.union(&context_fields).cloned().collect();

            return Ok(Self {
                problem_type,
                feature_fields: feature_fields.into_iter().collect(),
                context_fields: Some(context_fields.into_iter().collect()),
                fields,
            });
        }

        let fields: Vec<String> = feature_fields.into_iter().collect();
        Ok(Self {
            problem_type,
            feature_fields: fields.clone(),
            context_fields: None,
            fields,
        })
    }

    /// Context fields to evaluate against; empty unless the prompt is RAG
    pub fn evaluation_context_fields(&self) -> &[String] {
        if self.problem_type.is_rag() {
            self.context_fields.as_deref().unwrap_or(&[])
        } else {
            &[]
        }
    }
}

fn string_set(props: Option<&Value>, key: &str) -> BTreeSet<String> {
    props
        .and_then(|p| p.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
