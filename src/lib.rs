pub mod config;
pub mod corpus;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod types;

pub use config::SplicerConfig;
pub use corpus::{Corpus, SkippedSource};
pub use error::SpliceError;
pub use matching::common_run::longest_common_run;
pub use matching::recursion::reconstruct;
pub use matching::report::{
    aggregate_reports, compute_phrase_report, AggregateReport, Meta, PhraseReport, Report,
};
pub use matching::scanner::scan;
pub use matching::tokenization::{tokenize_phrase, CasePolicy};
pub use pipeline::builder::PhraseSplicerBuilder;
pub use pipeline::defaults::{ConcatListSink, InMemoryStore, JsonDirectoryStore, LongestRunSelector};
pub use pipeline::runtime::{PhraseSplicer, SplicedPhrase};
pub use pipeline::traits::{CandidateSelector, ClipSink, TranscriptStore};
pub use types::{
    ClipList, ClipRef, MatchCandidate, MatchRun, MatchedSegment, Reconstruction, Transcript,
    UnmatchedSpan, WordOccurrence,
};
