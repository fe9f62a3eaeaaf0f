use std::path::PathBuf;

use serde::Serialize;

use crate::error::SpliceError;
use crate::matching::index::TokenIndex;
use crate::pipeline::traits::TranscriptStore;
use crate::types::Transcript;

pub mod records;

/// A source the snapshot could not load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub source_id: String,
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Read-only snapshot of every loadable transcript, taken once per request.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    transcripts: Vec<Transcript>,
    index: TokenIndex,
    skipped: Vec<SkippedSource>,
}

impl Corpus {
    /// Load every source the store lists. A source that fails to load is
    /// logged and skipped; only failing to list the sources is an error.
    pub fn snapshot(store: &dyn TranscriptStore) -> Result<Self, SpliceError> {
        let source_ids = store.source_ids()?;
        let mut transcripts = Vec::with_capacity(source_ids.len());
        let mut skipped = Vec::new();

        for source_id in source_ids {
            match store.load(&source_id) {
                Ok(transcript) => transcripts.push(transcript),
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(
                        source_id = source_id.as_str(),
                        error = %err,
                        "corpus: skipping unreadable transcript"
                    );
                    let path = match &err {
                        SpliceError::CorpusRead { path, .. } => Some(path.clone()),
                        _ => None,
                    };
                    skipped.push(SkippedSource {
                        source_id,
                        path,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let corpus = Self::from_parts(transcripts, skipped);
        tracing::info!(
            sources = corpus.len(),
            skipped = corpus.skipped.len(),
            vocabulary = corpus.index.vocabulary_size(),
            "corpus: snapshot ready"
        );
        Ok(corpus)
    }

    pub fn from_transcripts(transcripts: Vec<Transcript>) -> Self {
        Self::from_parts(transcripts, Vec::new())
    }

    fn from_parts(mut transcripts: Vec<Transcript>, skipped: Vec<SkippedSource>) -> Self {
        transcripts.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        let index = TokenIndex::build(&transcripts);
        Self {
            transcripts,
            index,
            skipped,
        }
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn get(&self, source_id: &str) -> Option<&Transcript> {
        self.transcripts
            .binary_search_by(|t| t.source_id.as_str().cmp(source_id))
            .ok()
            .map(|idx| &self.transcripts[idx])
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    pub fn skipped(&self) -> &[SkippedSource] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}
