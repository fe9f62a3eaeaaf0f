use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rand::RngCore;
use walkdir::WalkDir;

use crate::corpus::records::{parse_records, transcript_from_records};
use crate::error::SpliceError;
use crate::matching::selection::select_longest;
use crate::matching::tokenization::CasePolicy;
use crate::pipeline::traits::{CandidateSelector, ClipSink, TranscriptStore};
use crate::types::{ClipList, MatchCandidate, Transcript};

/// One JSON transcript per recording under a root directory. The source id
/// is the file stem.
///
/// `source_ids` walks the root and remembers where each source lives, so a
/// snapshot costs one directory walk rather than one per source.
pub struct JsonDirectoryStore {
    root: PathBuf,
    extension: String,
    case_policy: CasePolicy,
    min_confidence: Option<f32>,
    discovered: Mutex<BTreeMap<String, PathBuf>>,
}

impl JsonDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "json".to_string(),
            case_policy: CasePolicy::default(),
            min_confidence: None,
            discovered: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_case_policy(mut self, case_policy: CasePolicy) -> Self {
        self.case_policy = case_policy;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: Option<f32>) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Transcript files keyed by source id. When two files share a stem the
    /// first in path order wins.
    fn discover(&self) -> Result<BTreeMap<String, PathBuf>, SpliceError> {
        if !self.root.is_dir() {
            return Err(SpliceError::invalid_input(format!(
                "corpus root is not a directory: {}",
                self.root.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.has_extension(path) {
                        paths.push(path.to_path_buf());
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "store: error walking corpus root");
                }
            }
        }
        paths.sort();

        let mut by_id = BTreeMap::new();
        for path in paths {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if by_id.contains_key(&stem) {
                tracing::warn!(
                    source_id = stem.as_str(),
                    path = %path.display(),
                    "store: duplicate source id ignored"
                );
                continue;
            }
            by_id.insert(stem, path);
        }
        Ok(by_id)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl TranscriptStore for JsonDirectoryStore {
    fn source_ids(&self) -> Result<Vec<String>, SpliceError> {
        let found = self.discover()?;
        let ids = found.keys().cloned().collect();
        *self.discovered.lock().unwrap_or_else(|e| e.into_inner()) = found;
        Ok(ids)
    }

    fn load(&self, source_id: &str) -> Result<Transcript, SpliceError> {
        let cached = self
            .discovered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(source_id)
            .cloned();
        let path = match cached {
            Some(path) => path,
            None => self.discover()?.remove(source_id).ok_or_else(|| {
                SpliceError::corpus_read(self.root.join(source_id), "transcript file not found")
            })?,
        };
        let data = fs::read_to_string(&path).map_err(|e| SpliceError::corpus_read(&path, e))?;
        let records = parse_records(&data).map_err(|e| SpliceError::corpus_read(&path, e))?;
        Ok(transcript_from_records(
            source_id,
            records,
            self.case_policy,
            self.min_confidence,
        ))
    }
}

/// Transcripts held in memory, for tests and embedding callers.
pub struct InMemoryStore {
    transcripts: Vec<Transcript>,
}

impl InMemoryStore {
    pub fn new(transcripts: Vec<Transcript>) -> Self {
        Self { transcripts }
    }
}

impl TranscriptStore for InMemoryStore {
    fn source_ids(&self) -> Result<Vec<String>, SpliceError> {
        Ok(self
            .transcripts
            .iter()
            .map(|t| t.source_id.clone())
            .collect())
    }

    fn load(&self, source_id: &str) -> Result<Transcript, SpliceError> {
        self.transcripts
            .iter()
            .find(|t| t.source_id == source_id)
            .cloned()
            .ok_or_else(|| SpliceError::corpus_read(source_id, "unknown in-memory source"))
    }
}

/// Longest run wins; equal-longest runs are drawn uniformly.
pub struct LongestRunSelector;

impl CandidateSelector for LongestRunSelector {
    fn select<'a>(
        &self,
        candidates: &'a BTreeMap<String, MatchCandidate>,
        rng: &mut dyn RngCore,
    ) -> Option<&'a MatchCandidate> {
        select_longest(candidates, rng)
    }
}

/// Writes an ffmpeg concat-demuxer list (`<stem>.txt`) instead of decoding audio.
pub struct ConcatListSink;

impl ClipSink for ConcatListSink {
    fn concatenate(
        &self,
        clips: &ClipList,
        output_dir: &Path,
        output_stem: &str,
    ) -> Result<PathBuf, SpliceError> {
        if clips.clips.is_empty() {
            return Err(SpliceError::invalid_input("no clips to concatenate"));
        }
        let missing: Vec<PathBuf> = clips
            .clips
            .iter()
            .filter(|c| !c.path.is_file())
            .map(|c| c.path.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SpliceError::MissingClips { missing });
        }

        fs::create_dir_all(output_dir)
            .map_err(|e| SpliceError::io("create concat output directory", e))?;
        let list_path = output_dir.join(format!("{output_stem}.txt"));
        let mut file =
            File::create(&list_path).map_err(|e| SpliceError::io("create concat list", e))?;
        for clip in &clips.clips {
            let absolute = clip
                .path
                .canonicalize()
                .map_err(|e| SpliceError::io("resolve clip path", e))?;
            writeln!(file, "file '{}'", escape_single_quotes(&absolute.to_string_lossy()))
                .map_err(|e| SpliceError::io("write concat list", e))?;
        }
        tracing::info!(
            clips = clips.clips.len(),
            path = %list_path.display(),
            "sink: wrote concat list"
        );
        Ok(list_path)
    }
}

/// ffmpeg concat lists quote paths with `'`; an embedded quote becomes `'\''`.
fn escape_single_quotes(path: &str) -> String {
    path.replace('\'', "'\\''")
}
