use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{ClipList, MatchedSegment, Reconstruction, UnmatchedSpan};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub phrases: Vec<PhraseReport>,
    pub aggregates: AggregateReport,
}

impl Report {
    pub const SCHEMA_VERSION: u32 = 1;

    pub fn new(meta: Meta, phrases: Vec<PhraseReport>) -> Self {
        let aggregates = aggregate_reports(&phrases);
        Self {
            schema_version: Self::SCHEMA_VERSION,
            meta,
            phrases,
            aggregates,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub corpus_root: String,
    pub case_policy: String,
    pub source_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhraseReport {
    pub phrase: String,
    pub token_count: u32,
    pub matched_token_count: u32,
    pub coverage_ratio: f32,
    pub segments: Vec<MatchedSegment>,
    pub gaps: Vec<UnmatchedSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub phrase_count: u32,
    pub complete_count: u32,
    pub token_count: u32,
    pub matched_token_count: u32,
    pub mean_coverage_ratio: f32,
    pub mean_segments_per_phrase: f32,
    pub distinct_sources_used: u32,
}

pub fn compute_phrase_report(
    phrase: &str,
    token_count: usize,
    reconstruction: &Reconstruction,
    clips: Option<&ClipList>,
) -> PhraseReport {
    let matched = reconstruction.matched_token_count();
    let coverage_ratio = if token_count == 0 {
        0.0
    } else {
        matched as f32 / token_count as f32
    };

    let mut notes = Vec::new();
    if token_count == 0 {
        notes.push("phrase has no tokens after normalization".to_string());
    }
    for gap in &reconstruction.gaps {
        notes.push(format!(
            "no source covers tokens {}..{} ({})",
            gap.phrase_span.start,
            gap.phrase_span.end,
            gap.tokens.join(" ")
        ));
    }

    PhraseReport {
        phrase: phrase.to_string(),
        token_count: to_u32(token_count),
        matched_token_count: to_u32(matched),
        coverage_ratio,
        segments: reconstruction.segments.clone(),
        gaps: reconstruction.gaps.clone(),
        clips: clips.map(|list| {
            list.clips
                .iter()
                .map(|c| c.path.to_string_lossy().into_owned())
                .collect()
        }),
        output: None,
        notes,
    }
}

pub fn aggregate_reports(phrases: &[PhraseReport]) -> AggregateReport {
    let token_count: usize = phrases.iter().map(|p| p.token_count as usize).sum();
    let matched_token_count: usize = phrases.iter().map(|p| p.matched_token_count as usize).sum();
    let complete_count = phrases
        .iter()
        .filter(|p| p.token_count > 0 && p.gaps.is_empty())
        .count();
    let sources: BTreeSet<&str> = phrases
        .iter()
        .flat_map(|p| p.segments.iter().map(|s| s.source_id.as_str()))
        .collect();

    AggregateReport {
        phrase_count: to_u32(phrases.len()),
        complete_count: to_u32(complete_count),
        token_count: to_u32(token_count),
        matched_token_count: to_u32(matched_token_count),
        mean_coverage_ratio: mean(phrases.iter().map(|p| p.coverage_ratio as f64)) as f32,
        mean_segments_per_phrase: mean(phrases.iter().map(|p| p.segments.len() as f64)) as f32,
        distinct_sources_used: to_u32(sources.len()),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
