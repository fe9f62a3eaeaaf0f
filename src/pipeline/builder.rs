use crate::config::SplicerConfig;
use crate::error::SpliceError;
use crate::matching::clips::ClipResolver;
use crate::pipeline::defaults::{ConcatListSink, JsonDirectoryStore, LongestRunSelector};
use crate::pipeline::runtime::{PhraseSplicer, PhraseSplicerParts};
use crate::pipeline::traits::{CandidateSelector, ClipSink, TranscriptStore};

pub struct PhraseSplicerBuilder {
    config: SplicerConfig,
    store: Option<Box<dyn TranscriptStore>>,
    selector: Option<Box<dyn CandidateSelector>>,
    sink: Option<Box<dyn ClipSink>>,
    seed: Option<u64>,
}

impl PhraseSplicerBuilder {
    pub fn new(config: SplicerConfig) -> Self {
        Self {
            config,
            store: None,
            selector: None,
            sink: None,
            seed: None,
        }
    }

    pub fn with_store(mut self, store: Box<dyn TranscriptStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_selector(mut self, selector: Box<dyn CandidateSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ClipSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Pin the tie-break generator. Without a seed every request draws from
    /// OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<PhraseSplicer, SpliceError> {
        let config = self.config;
        if config.clip_extension.trim().is_empty() {
            return Err(SpliceError::invalid_input("clip extension must not be empty"));
        }
        if let Some(floor) = config.min_confidence {
            if !(0.0..=1.0).contains(&floor) {
                return Err(SpliceError::invalid_input(format!(
                    "min_confidence must be within [0, 1], got {floor}"
                )));
            }
        }

        let store = match self.store {
            Some(store) => store,
            None => {
                if config.transcript_extension.trim().is_empty() {
                    return Err(SpliceError::invalid_input(
                        "transcript extension must not be empty",
                    ));
                }
                Box::new(
                    JsonDirectoryStore::new(&config.corpus_root)
                        .with_extension(config.transcript_extension.clone())
                        .with_case_policy(config.case_policy)
                        .with_min_confidence(config.min_confidence),
                )
            }
        };
        let clip_resolver = ClipResolver::new(&config.clip_root, config.clip_extension.clone())
            .with_verification(config.verify_clips);

        Ok(PhraseSplicer::from_parts(PhraseSplicerParts {
            store,
            selector: self
                .selector
                .unwrap_or_else(|| Box::new(LongestRunSelector)),
            sink: self.sink.unwrap_or_else(|| Box::new(ConcatListSink)),
            clip_resolver,
            case_policy: config.case_policy,
            seed: self.seed,
        }))
    }
}
