use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SpliceError;
use crate::matching::tokenization::CasePolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SplicerConfig {
    /// Directory searched recursively for per-source transcript files.
    pub corpus_root: PathBuf,
    /// Directory holding one sub-directory of word clips per source.
    pub clip_root: PathBuf,
    pub clip_extension: String,
    pub transcript_extension: String,
    pub case_policy: CasePolicy,
    /// Words whose recorded confidence is at or below this floor are dropped on load.
    pub min_confidence: Option<f32>,
    /// Check that every resolved clip exists on disk.
    pub verify_clips: bool,
}

impl SplicerConfig {
    pub const DEFAULT_CLIP_EXTENSION: &'static str = "wav";
    pub const DEFAULT_TRANSCRIPT_EXTENSION: &'static str = "json";

    pub fn load(path: &Path) -> Result<Self, SpliceError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SpliceError::io("read splicer config", e))?;
        serde_json::from_str(&data).map_err(|e| SpliceError::json("parse splicer config", e))
    }
}

impl Default for SplicerConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("recordings"),
            clip_root: PathBuf::from("recordings"),
            clip_extension: Self::DEFAULT_CLIP_EXTENSION.to_string(),
            transcript_extension: Self::DEFAULT_TRANSCRIPT_EXTENSION.to_string(),
            case_policy: CasePolicy::Lowercase,
            min_confidence: None,
            verify_clips: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splicer_config_default() {
        let config = SplicerConfig::default();
        assert_eq!(config.corpus_root, PathBuf::from("recordings"));
        assert_eq!(config.clip_extension, "wav");
        assert_eq!(config.transcript_extension, "json");
        assert_eq!(config.case_policy, CasePolicy::Lowercase);
        assert!(config.min_confidence.is_none());
        assert!(config.verify_clips);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let json = r#"{
            "corpus_root": "data/whisper_transcriptions",
            "case_policy": "preserve",
            "min_confidence": 0.9
        }"#;
        let config: SplicerConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.corpus_root, PathBuf::from("data/whisper_transcriptions"));
        assert_eq!(config.clip_root, PathBuf::from("recordings"));
        assert_eq!(config.case_policy, CasePolicy::Preserve);
        assert_eq!(config.min_confidence, Some(0.9));
        assert_eq!(config.clip_extension, SplicerConfig::DEFAULT_CLIP_EXTENSION);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SplicerConfig::load(Path::new("/nonexistent/splicer.json")).unwrap_err();
        assert!(matches!(err, SpliceError::Io { .. }));
    }
}
