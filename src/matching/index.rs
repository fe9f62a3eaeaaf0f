use std::collections::{BTreeMap, HashMap};

use crate::types::Transcript;

/// One occurrence of a token: transcript index in the corpus and word position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub source: usize,
    pub position: usize,
}

/// Per-token posting lists over a corpus snapshot. Built once per snapshot.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    postings: HashMap<String, Vec<Posting>>,
}

impl TokenIndex {
    pub fn build(transcripts: &[Transcript]) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        for (source, transcript) in transcripts.iter().enumerate() {
            for (position, token) in transcript.tokens.iter().enumerate() {
                if token.is_empty() {
                    continue;
                }
                postings
                    .entry(token.clone())
                    .or_default()
                    .push(Posting { source, position });
            }
        }
        Self { postings }
    }

    pub fn postings(&self, token: &str) -> &[Posting] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    /// Earliest position of any of `tokens` in each transcript holding one,
    /// keyed by transcript index. No run with `tokens` starts before it, and
    /// transcripts missing from the map have no run at all.
    pub fn first_shared_positions<T: AsRef<str>>(&self, tokens: &[T]) -> BTreeMap<usize, usize> {
        let mut first: BTreeMap<usize, usize> = BTreeMap::new();
        for posting in tokens.iter().flat_map(|t| self.postings(t.as_ref())) {
            first
                .entry(posting.source)
                .and_modify(|position| *position = (*position).min(posting.position))
                .or_insert(posting.position);
        }
        first
    }
}
