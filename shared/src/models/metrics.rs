//! Metric records and their aggregation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metrics reported by the custom monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    AnswerRelevance,
    TextReadingEase,
    SocialBias,
    Jailbreak,
    TextGradeLevel,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::AnswerRelevance,
        MetricKind::TextReadingEase,
        MetricKind::SocialBias,
        MetricKind::Jailbreak,
        MetricKind::TextGradeLevel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::AnswerRelevance => "answer_relevance",
            MetricKind::TextReadingEase => "text_reading_ease",
            MetricKind::SocialBias => "social_bias",
            MetricKind::Jailbreak => "jailbreak",
            MetricKind::TextGradeLevel => "text_grade_level",
        }
    }

    /// Whether the metric is computed in-process rather than by a model
    pub fn is_local(&self) -> bool {
        matches!(self, MetricKind::TextReadingEase | MetricKind::TextGradeLevel)
    }

    pub fn remote() -> impl Iterator<Item = MetricKind> {
        Self::ALL.into_iter().filter(|m| !m.is_local())
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single metric value for one payload record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: Option<String>,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,
}

impl MetricRecord {
    pub fn new(kind: MetricKind, value: f64, record_index: usize) -> Self {
        Self {
            name: Some(kind.name().to_string()),
            value: Some(value),
            record_index: Some(record_index),
        }
    }
}

/// Mean value of each metric across a run
pub type MetricSummary = BTreeMap<String, f64>;

/// Average each metric over the records that carry both a name and a value
pub fn calc_mean(records: &[MetricRecord]) -> MetricSummary {
    let mut sums: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

    for record in records {
        let (Some(name), Some(value)) = (record.name.as_deref(), record.value) else {
            continue;
        };
        let entry = sums.entry(name).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    sums.into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(name, (sum, count))| (name.to_string(), sum / f64::from(count)))
        .collect()
}
