use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpliceError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// One transcript could not be read or parsed. Recovered by the corpus
    /// snapshot, which skips the source.
    #[error("unreadable transcript '{}': {message}", path.display())]
    CorpusRead { path: PathBuf, message: String },
    #[error("no clip for '{token}' from source '{source_id}' (expected {})", path.display())]
    Resolution {
        source_id: String,
        token: String,
        path: PathBuf,
    },
    #[error("{} clip(s) missing before concatenation, first: {}", missing.len(), first_missing(missing))]
    MissingClips { missing: Vec<PathBuf> },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

fn first_missing(missing: &[PathBuf]) -> String {
    missing
        .first()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

impl SpliceError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn corpus_read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::CorpusRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// True for errors the corpus snapshot recovers from by skipping a source.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CorpusRead { .. })
    }
}
