use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

/// One recognized word inside a recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordOccurrence {
    /// Word text exactly as written by the recognizer.
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence: Option<f32>,
}

/// Time-stamped word sequence recognized from a single recording.
///
/// `tokens[i]` is the normalized comparison form of `words[i]`; both vectors
/// always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub source_id: String,
    pub words: Vec<WordOccurrence>,
    pub tokens: Vec<String>,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Contiguous equal run between a source and a target sequence.
/// Both intervals are `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRun {
    pub source_start: usize,
    pub source_end: usize,
    pub target_start: usize,
    pub target_end: usize,
    pub length: usize,
}

impl MatchRun {
    pub fn source_span(&self) -> Range<usize> {
        self.source_start..self.source_end
    }

    pub fn target_span(&self) -> Range<usize> {
        self.target_start..self.target_end
    }
}

/// Best run one source offers for the current residual phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub source_id: String,
    pub matched_tokens: Vec<String>,
    pub source_span: Range<usize>,
    /// Span inside the residual phrase the candidate was computed for.
    pub target_span: Range<usize>,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedSegment {
    pub source_id: String,
    pub matched_tokens: Vec<String>,
    pub source_span: Range<usize>,
    /// Position of the segment inside the original target phrase.
    pub phrase_span: Range<usize>,
    pub start_time: f64,
    pub end_time: f64,
}

/// Slice of the original phrase for which no source had any overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedSpan {
    pub phrase_span: Range<usize>,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Reconstruction {
    pub segments: Vec<MatchedSegment>,
    pub gaps: Vec<UnmatchedSpan>,
}

impl Reconstruction {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn matched_token_count(&self) -> usize {
        self.segments.iter().map(|s| s.matched_tokens.len()).sum()
    }

    /// Concatenation of all matched tokens in phrase order.
    pub fn matched_tokens(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|s| s.matched_tokens.iter().map(String::as_str))
            .collect()
    }
}

/// Audio clip for one matched word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRef {
    pub source_id: String,
    pub token: String,
    pub path: PathBuf,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClipList {
    pub clips: Vec<ClipRef>,
}

impl ClipList {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.clips.iter().map(|c| c.path.clone()).collect()
    }
}
