use serde::{Deserialize, Deserializer};

use crate::matching::tokenization::{normalize_word, CasePolicy};
use crate::types::{Transcript, WordOccurrence};

/// One entry of a per-source transcript file.
///
/// Recognizers disagree on how offsets are written, so seconds are accepted as
/// either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub word: String,
    #[serde(deserialize_with = "seconds")]
    pub start_time: f64,
    #[serde(deserialize_with = "seconds")]
    pub end_time: f64,
    #[serde(default)]
    pub confidence: Option<f32>,
}

fn seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(value) => Ok(value),
        Seconds::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid seconds '{text}': {err}"))),
    }
}

pub fn parse_records(data: &str) -> Result<Vec<WordRecord>, serde_json::Error> {
    serde_json::from_str(data)
}

/// Build a transcript from raw records, applying the confidence floor and the
/// token normalization shared with target phrases.
pub fn transcript_from_records(
    source_id: impl Into<String>,
    records: Vec<WordRecord>,
    case_policy: CasePolicy,
    min_confidence: Option<f32>,
) -> Transcript {
    let mut words = Vec::with_capacity(records.len());
    let mut tokens = Vec::with_capacity(records.len());
    for record in records {
        if let (Some(floor), Some(confidence)) = (min_confidence, record.confidence) {
            if confidence <= floor {
                continue;
            }
        }
        if record.word.trim().contains(char::is_whitespace) {
            tracing::debug!(
                word = record.word.as_str(),
                start_time = record.start_time,
                "records: multi-word entry kept as a single token"
            );
        }
        tokens.push(normalize_word(&record.word, case_policy));
        words.push(WordOccurrence {
            word: record.word,
            start_time: record.start_time,
            end_time: record.end_time,
            confidence: record.confidence,
        });
    }
    Transcript {
        source_id: source_id.into(),
        words,
        tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::common_run::longest_common_run;
    use crate::matching::tokenization::tokenize_phrase;

    #[test]
    fn accepts_numeric_and_string_offsets() {
        let json = r#"[
            {"word": "Hello", "startTime": 0.5, "endTime": 0.9},
            {"word": "world.", "startTime": "1.2", "endTime": "1.75", "confidence": 0.97}
        ]"#;
        let records = parse_records(json).expect("valid records");
        assert_eq!(records.len(), 2);
        assert!((records[1].start_time - 1.2).abs() < 1e-9);
        assert!((records[1].end_time - 1.75).abs() < 1e-9);
        assert_eq!(records[0].confidence, None);
    }

    #[test]
    fn rejects_non_numeric_offsets() {
        let json = r#"[{"word": "hi", "startTime": "soon", "endTime": 1.0}]"#;
        assert!(parse_records(json).is_err());
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(parse_records(r#"{"word": "hi"}"#).is_err());
    }

    #[test]
    fn tokens_follow_case_policy_and_words_keep_recorded_text() {
        let json = r#"[
            {"word": "Hello", "startTime": 0.0, "endTime": 0.4},
            {"word": "World!", "startTime": 0.4, "endTime": 0.8}
        ]"#;
        let transcript =
            transcript_from_records("src", parse_records(json).unwrap(), CasePolicy::Lowercase, None);
        assert_eq!(transcript.tokens, ["hello", "world"]);
        assert_eq!(transcript.words[1].word, "World!");
        assert_eq!(transcript.words.len(), transcript.tokens.len());
    }

    #[test]
    fn multi_word_entry_keeps_one_slot() {
        let json = r#"[
            {"word": "to", "startTime": 0.0, "endTime": 0.2},
            {"word": "New York", "startTime": 0.2, "endTime": 0.9}
        ]"#;
        let transcript =
            transcript_from_records("src", parse_records(json).unwrap(), CasePolicy::Lowercase, None);
        assert_eq!(transcript.tokens, ["to", "newyork"]);
        assert_eq!(transcript.words.len(), 2);
        assert_eq!(transcript.words[1].word, "New York");

        let phrase = tokenize_phrase("to new york", CasePolicy::Lowercase);
        let run = longest_common_run(&transcript.tokens, &phrase).expect("shares 'to'");
        assert_eq!(run.length, 1);
        assert_eq!(run.source_span(), 0..1);
    }

    #[test]
    fn confidence_floor_drops_weak_words_only() {
        let json = r#"[
            {"word": "a", "startTime": 0.0, "endTime": 0.1, "confidence": 0.95},
            {"word": "b", "startTime": 0.1, "endTime": 0.2, "confidence": 0.9},
            {"word": "c", "startTime": 0.2, "endTime": 0.3}
        ]"#;
        let transcript = transcript_from_records(
            "src",
            parse_records(json).unwrap(),
            CasePolicy::Lowercase,
            Some(0.9),
        );
        assert_eq!(transcript.tokens, ["a", "c"]);
    }
}
