//! Metric aggregation tests
//!
//! Tests for metric averaging including:
//! - Property 1: Mean Per Metric
//! - Property 2: Incomplete Records Ignored

use proptest::prelude::*;
use shared::{calc_mean, MetricKind, MetricRecord};

fn record(name: &str, value: f64) -> MetricRecord {
    MetricRecord {
        name: Some(name.to_string()),
        value: Some(value),
        record_index: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn test_mean_of_single_metric() {
        let records = vec![
            record("answer_relevance", 0.2),
            record("answer_relevance", 0.6),
            record("answer_relevance", 1.0),
        ];
        let summary = calc_mean(&records);
        assert!((summary["answer_relevance"] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_are_independent() {
        let records = vec![
            record("jailbreak", 0.0),
            record("social_bias", 1.0),
            record("jailbreak", 1.0),
        ];
        let summary = calc_mean(&records);
        assert_eq!(summary["jailbreak"], 0.5);
        assert_eq!(summary["social_bias"], 1.0);
    }

    #[test]
    fn test_metric_names_match_monitor_definition() {
        let names: Vec<_> = MetricKind::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "answer_relevance",
                "text_reading_ease",
                "social_bias",
                "jailbreak",
                "text_grade_level"
            ]
        );
    }

    #[test]
    fn test_metric_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MetricKind::TextGradeLevel).unwrap();
        assert_eq!(json, "\"text_grade_level\"");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn metric_name_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["answer_relevance", "social_bias", "jailbreak"])
    }

    fn value_strategy() -> impl Strategy<Value = f64> {
        0.0f64..1.0f64
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 1: Mean Per Metric
        /// Each reported mean equals the sum over count of that metric's values
        #[test]
        fn prop_mean_matches_sum_over_count(
            entries in prop::collection::vec((metric_name_strategy(), value_strategy()), 1..50)
        ) {
            let records: Vec<_> = entries.iter().map(|(n, v)| record(n, *v)).collect();
            let summary = calc_mean(&records);

            for (name, mean) in &summary {
                let values: Vec<f64> = entries
                    .iter()
                    .filter(|(n, _)| *n == name.as_str())
                    .map(|(_, v)| *v)
                    .collect();
                let expected = values.iter().sum::<f64>() / values.len() as f64;
                prop_assert!((mean - expected).abs() < 1e-9);
            }
        }

        /// Property 1: Means stay within the observed range
        #[test]
        fn prop_mean_within_bounds(
            entries in prop::collection::vec((metric_name_strategy(), value_strategy()), 1..50)
        ) {
            let records: Vec<_> = entries.iter().map(|(n, v)| record(n, *v)).collect();
            for mean in calc_mean(&records).values() {
                prop_assert!(*mean >= 0.0 && *mean <= 1.0);
            }
        }

        /// Property 2: Incomplete Records Ignored
        /// Records without a name or a value never change the summary
        #[test]
        fn prop_incomplete_records_ignored(
            entries in prop::collection::vec((metric_name_strategy(), value_strategy()), 0..30),
            noise in 0usize..10
        ) {
            let records: Vec<_> = entries.iter().map(|(n, v)| record(n, *v)).collect();
            let mut noisy = records.clone();
            for i in 0..noise {
                noisy.push(MetricRecord { name: None, value: Some(i as f64), record_index: None });
                noisy.push(MetricRecord {
                    name: Some("jailbreak".to_string()),
                    value: None,
                    record_index: None,
                });
            }

            prop_assert_eq!(calc_mean(&records), calc_mean(&noisy));
        }
    }
}
