//! Readability scores for generated text
//!
//! Implements Flesch reading ease and the Flesch-Kincaid grade level. Syllables
//! are estimated with a spelling heuristic so no pronunciation dictionary has
//! to be shipped with the service.

use crate::models::{MetricKind, MetricRecord, PayloadRow};

const VOWELS: &[u8] = b"aeiouy";
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Word, sentence and syllable counts of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStatistics {
    pub words: u32,
    pub sentences: u32,
    pub syllables: u32,
}

impl TextStatistics {
    /// Returns `None` when the text has no words
    pub fn from_text(text: &str) -> Option<Self> {
        let words = tokenize_words(text);
        if words.is_empty() {
            return None;
        }

        let syllables = words.iter().map(|w| count_syllables(w)).sum();

        Some(Self {
            words: words.len() as u32,
            sentences: count_sentences(text).max(1),
            syllables,
        })
    }

    fn words_per_sentence(&self) -> f64 {
        f64::from(self.words) / f64::from(self.sentences)
    }

    fn syllables_per_word(&self) -> f64 {
        f64::from(self.syllables) / f64::from(self.words)
    }

    pub fn reading_ease(&self) -> f64 {
        206.835 - 1.015 * self.words_per_sentence() - 84.6 * self.syllables_per_word()
    }

    pub fn grade_level(&self) -> f64 {
        0.39 * self.words_per_sentence() + 11.8 * self.syllables_per_word() - 15.59
    }
}

pub fn flesch_reading_ease(text: &str) -> Option<f64> {
    TextStatistics::from_text(text).map(|s| s.reading_ease())
}

pub fn flesch_kincaid_grade(text: &str) -> Option<f64> {
    TextStatistics::from_text(text).map(|s| s.grade_level())
}

/// Local metric records for each row's generated text
pub fn readability_records(rows: &[PayloadRow]) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(rows.len() * 2);

    for (index, row) in rows.iter().enumerate() {
        let Some(stats) = row.generated_text().and_then(TextStatistics::from_text) else {
            continue;
        };
        records.push(MetricRecord::new(
            MetricKind::TextReadingEase,
            stats.reading_ease(),
            index,
        ));
        records.push(MetricRecord::new(
            MetricKind::TextGradeLevel,
            stats.grade_level(),
            index,
        ));
    }

    records
}

/// Split on anything that is not alphanumeric, keeping inner apostrophes
pub fn tokenize_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Number of sentence segments containing at least one word character
pub fn count_sentences(text: &str) -> u32 {
    text.split(SENTENCE_TERMINATORS)
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .count() as u32
}

/// Heuristic syllable count, never less than one
pub fn count_syllables(word: &str) -> u32 {
    let lower: String = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if lower.len() <= 3 {
        return 1;
    }

    let mut stem = lower.as_bytes();

    // silent endings: "-es", "-ed", trailing "e" (but "-le" is voiced)
    let keeps_e = |b: u8| b == b'l' || VOWELS.contains(&b);
    if stem.ends_with(b"es") && !keeps_e(stem[stem.len() - 3]) {
        stem = &stem[..stem.len() - 2];
    } else if stem.ends_with(b"ed") {
        stem = &stem[..stem.len() - 2];
    } else if stem.ends_with(b"e") && !keeps_e(stem[stem.len() - 2]) {
        stem = &stem[..stem.len() - 1];
    }

    if stem.first() == Some(&b'y') {
        stem = &stem[1..];
    }

    let mut count = 0;
    let mut run = 0;
    for &b in stem {
        if VOWELS.contains(&b) {
            run += 1;
        } else if run > 0 {
            count += (run + 1) / 2;
            run = 0;
        }
    }
    count += (run + 1) / 2;

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("makes"), 1);
        assert_eq!(count_syllables("water"), 2);
        assert_eq!(count_syllables("banana"), 3);
        assert_eq!(count_syllables("quickly"), 2);
        assert_eq!(count_syllables("2024"), 1);
    }

    #[test]
    fn test_sentences() {
        assert_eq!(count_sentences("Hello there. How are you?"), 2);
        assert_eq!(count_sentences("Wait... what?!"), 2);
        assert_eq!(count_sentences("No terminator"), 1);
        assert_eq!(count_sentences("..."), 0);
    }

    #[test]
    fn test_words() {
        assert_eq!(tokenize_words("It's a 'quoted' word-pair"), vec!["It's", "a", "quoted", "word", "pair"]);
        assert!(tokenize_words("  ... !! ").is_empty());
    }

    #[test]
    fn test_simple_sentence_scores() {
        // 3 words, 1 sentence, 3 syllables
        let ease = flesch_reading_ease("The cat sat.").unwrap();
        let grade = flesch_kincaid_grade("The cat sat.").unwrap();
        assert!((ease - 119.19).abs() < 1e-9);
        assert!((grade - (-2.62)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_no_score() {
        assert_eq!(flesch_reading_ease(""), None);
        assert_eq!(flesch_kincaid_grade("?!"), None);
    }

    #[test]
    fn test_records_skip_rows_without_text() {
        let rows = vec![
            PayloadRow::from_record(&json!({ "entity": { "values": { "generated_text": "The cat sat." } } }), &[]),
            PayloadRow::from_record(&json!({ "entity": { "values": {} } }), &[]),
        ];
        let records = readability_records(&rows);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.record_index == Some(0)));
    }
}
