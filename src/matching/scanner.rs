use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::corpus::Corpus;
use crate::matching::common_run::longest_common_run;
use crate::types::MatchCandidate;

/// Best run per source for `residual`, keyed by source id.
///
/// Only sources sharing at least one token with `residual` are matched, each
/// starting from its first shared word; the rest cannot contribute a run.
/// Sources are matched in parallel and the result is ordered by source id
/// regardless of completion order.
pub fn scan<T>(corpus: &Corpus, residual: &[T]) -> BTreeMap<String, MatchCandidate>
where
    T: AsRef<str> + Sync,
{
    if residual.is_empty() || corpus.is_empty() {
        return BTreeMap::new();
    }

    let sharing: Vec<(usize, usize)> = corpus
        .index()
        .first_shared_positions(residual)
        .into_iter()
        .collect();
    let transcripts = corpus.transcripts();

    let candidates: BTreeMap<String, MatchCandidate> = sharing
        .par_iter()
        .filter_map(|&(idx, first)| {
            let transcript = &transcripts[idx];
            // Nothing before `first` can match, so the run found on the tail
            // is the one the full transcript would give.
            let run = longest_common_run(&transcript.tokens[first..], residual)?;
            let source_span = run.source_start + first..run.source_end + first;
            Some((
                transcript.source_id.clone(),
                MatchCandidate {
                    source_id: transcript.source_id.clone(),
                    matched_tokens: transcript.tokens[source_span.clone()].to_vec(),
                    source_span,
                    target_span: run.target_span(),
                    length: run.length,
                },
            ))
        })
        .collect();

    tracing::debug!(
        residual_len = residual.len(),
        sources_considered = sharing.len(),
        candidates = candidates.len(),
        "scanner: corpus scan complete"
    );
    candidates
}
