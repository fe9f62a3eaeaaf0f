use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::error::SpliceError;
use crate::types::{ClipList, MatchCandidate, Transcript};

/// Supplies per-source transcripts.
pub trait TranscriptStore: Send + Sync {
    fn source_ids(&self) -> Result<Vec<String>, SpliceError>;

    /// Recoverable failures must be reported as `SpliceError::CorpusRead`.
    fn load(&self, source_id: &str) -> Result<Transcript, SpliceError>;
}

/// Picks the candidate consumed at one recursion step.
pub trait CandidateSelector: Send + Sync {
    fn select<'a>(
        &self,
        candidates: &'a BTreeMap<String, MatchCandidate>,
        rng: &mut dyn RngCore,
    ) -> Option<&'a MatchCandidate>;
}

/// Downstream consumer of the ordered clip list.
pub trait ClipSink: Send + Sync {
    /// Merge `clips` in order into one output named `output_stem` and return
    /// its location. Must fail if any clip is missing.
    fn concatenate(
        &self,
        clips: &ClipList,
        output_dir: &Path,
        output_stem: &str,
    ) -> Result<PathBuf, SpliceError>;
}
