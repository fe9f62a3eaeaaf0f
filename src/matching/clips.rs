use std::path::{Path, PathBuf};

use crate::corpus::Corpus;
use crate::error::SpliceError;
use crate::matching::tokenization::sanitize_file_stem;
use crate::types::{ClipList, ClipRef, MatchedSegment};

/// Maps matched words to the per-word clips cut from their recordings.
///
/// Clips live at `{clip_root}/{source_id}/{word}.{extension}`, where `word`
/// is the recorded word reduced to ASCII alphanumerics.
#[derive(Debug, Clone)]
pub struct ClipResolver {
    clip_root: PathBuf,
    extension: String,
    verify_exists: bool,
}

impl ClipResolver {
    pub fn new(clip_root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            clip_root: clip_root.into(),
            extension: extension.into(),
            verify_exists: true,
        }
    }

    pub fn with_verification(mut self, verify_exists: bool) -> Self {
        self.verify_exists = verify_exists;
        self
    }

    pub fn clip_path(&self, source_id: &str, word: &str) -> PathBuf {
        let mut file_name = sanitize_file_stem(word);
        file_name.push('.');
        file_name.push_str(&self.extension);
        self.clip_root.join(source_id).join(file_name)
    }

    /// One clip per matched token, in segment order. Any unresolvable clip
    /// fails the whole request.
    pub fn resolve(
        &self,
        corpus: &Corpus,
        segments: &[MatchedSegment],
    ) -> Result<ClipList, SpliceError> {
        let mut clips = Vec::with_capacity(segments.iter().map(|s| s.matched_tokens.len()).sum());
        for segment in segments {
            let transcript = corpus.get(&segment.source_id).ok_or_else(|| {
                SpliceError::invalid_input(format!(
                    "segment references unknown source '{}'",
                    segment.source_id
                ))
            })?;
            for (offset, token) in segment.matched_tokens.iter().enumerate() {
                let position = segment.source_span.start + offset;
                let occurrence = transcript.words.get(position).ok_or_else(|| {
                    SpliceError::invalid_input(format!(
                        "word {position} out of range for source '{}'",
                        segment.source_id
                    ))
                })?;
                let path = self.clip_path(&segment.source_id, &occurrence.word);
                if self.verify_exists && !is_file(&path) {
                    return Err(SpliceError::Resolution {
                        source_id: segment.source_id.clone(),
                        token: token.clone(),
                        path,
                    });
                }
                clips.push(ClipRef {
                    source_id: segment.source_id.clone(),
                    token: token.clone(),
                    path,
                    start_time: occurrence.start_time,
                    end_time: occurrence.end_time,
                });
            }
        }
        tracing::debug!(clips = clips.len(), "clips: resolved clip list");
        Ok(ClipList { clips })
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Transcript, WordOccurrence};

    fn transcript(id: &str, recorded: &[&str]) -> Transcript {
        Transcript {
            source_id: id.to_string(),
            words: recorded
                .iter()
                .enumerate()
                .map(|(i, w)| WordOccurrence {
                    word: w.to_string(),
                    start_time: i as f64,
                    end_time: i as f64 + 0.4,
                    confidence: None,
                })
                .collect(),
            tokens: recorded.iter().map(|w| sanitize_file_stem(w).to_lowercase()).collect(),
        }
    }

    fn segment(source_id: &str, tokens: &[&str], start: usize, phrase_start: usize) -> MatchedSegment {
        MatchedSegment {
            source_id: source_id.to_string(),
            matched_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            source_span: start..start + tokens.len(),
            phrase_span: phrase_start..phrase_start + tokens.len(),
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    #[test]
    fn clip_path_uses_sanitized_recorded_word() {
        let resolver = ClipResolver::new("recordings", "wav");
        assert_eq!(
            resolver.clip_path("20220711T022903911Z", "Don't"),
            PathBuf::from("recordings/20220711T022903911Z/Dont.wav")
        );
    }

    #[test]
    fn resolves_in_segment_order_without_verification() {
        let corpus = Corpus::from_transcripts(vec![
            transcript("A", &["I", "am", "doing", "well", "today."]),
            transcript("B", &["What", "are", "you", "doing"]),
        ]);
        let segments = vec![
            segment("B", &["what", "are", "you", "doing"], 0, 0),
            segment("A", &["well", "today"], 3, 4),
        ];
        let clips = ClipResolver::new("clips", "wav")
            .with_verification(false)
            .resolve(&corpus, &segments)
            .expect("resolve");
        let names: Vec<String> = clips
            .paths()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "clips/B/What.wav",
                "clips/B/are.wav",
                "clips/B/you.wav",
                "clips/B/doing.wav",
                "clips/A/well.wav",
                "clips/A/today.wav",
            ]
        );
        assert!((clips.clips[5].start_time - 4.0).abs() < 1e-9);
    }

    #[test]
    fn missing_clip_fails_loudly() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("A").join("well.wav"), b"RIFF").unwrap();

        let corpus = Corpus::from_transcripts(vec![transcript("A", &["well", "today"])]);
        let resolver = ClipResolver::new(dir.path(), "wav");

        let ok = resolver.resolve(&corpus, &[segment("A", &["well"], 0, 0)]);
        assert_eq!(ok.expect("clip exists").clips.len(), 1);

        let err = resolver
            .resolve(&corpus, &[segment("A", &["well", "today"], 0, 0)])
            .unwrap_err();
        match err {
            SpliceError::Resolution { token, path, .. } => {
                assert_eq!(token, "today");
                assert!(path.ends_with("A/today.wav"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        let corpus = Corpus::default();
        let err = ClipResolver::new("clips", "wav")
            .with_verification(false)
            .resolve(&corpus, &[segment("ghost", &["boo"], 0, 0)])
            .unwrap_err();
        assert!(matches!(err, SpliceError::InvalidInput { .. }));
    }
}
