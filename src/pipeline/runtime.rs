use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::corpus::Corpus;
use crate::error::SpliceError;
use crate::matching::clips::ClipResolver;
use crate::matching::recursion::reconstruct;
use crate::matching::tokenization::{output_stem, tokenize_phrase, CasePolicy};
use crate::pipeline::traits::{CandidateSelector, ClipSink, TranscriptStore};
use crate::types::{ClipList, Reconstruction};

/// A phrase rebuilt from recorded words, with the clips to play it.
#[derive(Debug, Clone)]
pub struct SplicedPhrase {
    pub phrase: String,
    pub tokens: Vec<String>,
    pub reconstruction: Reconstruction,
    pub clips: ClipList,
    /// Location of the merged output, when a sink was run.
    pub output: Option<PathBuf>,
}

pub struct PhraseSplicer {
    store: Box<dyn TranscriptStore>,
    selector: Box<dyn CandidateSelector>,
    sink: Box<dyn ClipSink>,
    clip_resolver: ClipResolver,
    case_policy: CasePolicy,
    seed: Option<u64>,
}

pub(crate) struct PhraseSplicerParts {
    pub store: Box<dyn TranscriptStore>,
    pub selector: Box<dyn CandidateSelector>,
    pub sink: Box<dyn ClipSink>,
    pub clip_resolver: ClipResolver,
    pub case_policy: CasePolicy,
    pub seed: Option<u64>,
}

impl PhraseSplicer {
    pub(crate) fn from_parts(parts: PhraseSplicerParts) -> Self {
        Self {
            store: parts.store,
            selector: parts.selector,
            sink: parts.sink,
            clip_resolver: parts.clip_resolver,
            case_policy: parts.case_policy,
            seed: parts.seed,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.case_policy
    }

    /// Tie-break generator for one top-level request.
    pub fn request_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Load the corpus once; reuse the snapshot for every recursion step of a
    /// request (and across requests, if the corpus is not changing).
    pub fn snapshot(&self) -> Result<Corpus, SpliceError> {
        Corpus::snapshot(self.store.as_ref())
    }

    pub fn tokenize(&self, phrase: &str) -> Vec<String> {
        tokenize_phrase(phrase, self.case_policy)
    }

    pub fn reconstruct(
        &self,
        corpus: &Corpus,
        phrase: &str,
        rng: &mut dyn RngCore,
    ) -> Reconstruction {
        let tokens = self.tokenize(phrase);
        reconstruct(corpus, &tokens, self.selector.as_ref(), rng)
    }

    /// Snapshot the corpus and rebuild a single phrase.
    pub fn reconstruct_phrase(&self, phrase: &str) -> Result<Reconstruction, SpliceError> {
        let corpus = self.snapshot()?;
        let mut rng = self.request_rng();
        Ok(self.reconstruct(&corpus, phrase, &mut rng))
    }

    pub fn resolve_clips(
        &self,
        corpus: &Corpus,
        reconstruction: &Reconstruction,
    ) -> Result<ClipList, SpliceError> {
        self.clip_resolver.resolve(corpus, &reconstruction.segments)
    }

    /// Hand `clips` to the sink; the output is named after `tokens`.
    pub fn concatenate(
        &self,
        clips: &ClipList,
        tokens: &[String],
        output_dir: &Path,
    ) -> Result<PathBuf, SpliceError> {
        let stem = output_stem(tokens)
            .ok_or_else(|| SpliceError::invalid_input("cannot name output for an empty phrase"))?;
        self.sink.concatenate(clips, output_dir, &stem)
    }

    /// Rebuild `phrase` and resolve its clips. With `output_dir`, the clips
    /// are also handed to the sink and the merged output is named after the
    /// phrase.
    pub fn splice(
        &self,
        corpus: &Corpus,
        phrase: &str,
        rng: &mut dyn RngCore,
        output_dir: Option<&Path>,
    ) -> Result<SplicedPhrase, SpliceError> {
        let tokens = self.tokenize(phrase);
        if output_stem(&tokens).is_none() {
            return Err(SpliceError::invalid_input(format!(
                "phrase '{phrase}' has no usable words"
            )));
        }

        let reconstruction = reconstruct(corpus, &tokens, self.selector.as_ref(), rng);
        if !reconstruction.is_complete() {
            tracing::warn!(
                phrase,
                gaps = reconstruction.gaps.len(),
                missing_tokens = tokens.len() - reconstruction.matched_token_count(),
                "splicer: phrase only partially reconstructed"
            );
        }
        let clips = self.resolve_clips(corpus, &reconstruction)?;

        let output = match output_dir {
            Some(dir) => Some(self.concatenate(&clips, &tokens, dir)?),
            None => None,
        };

        Ok(SplicedPhrase {
            phrase: phrase.to_string(),
            tokens,
            reconstruction,
            clips,
            output,
        })
    }
}
