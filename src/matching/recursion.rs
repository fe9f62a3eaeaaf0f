use std::ops::Range;

use rand::RngCore;

use crate::corpus::Corpus;
use crate::matching::scanner::scan;
use crate::pipeline::traits::CandidateSelector;
use crate::types::{MatchCandidate, MatchedSegment, Reconstruction, Transcript, UnmatchedSpan};

/// Rebuild `phrase` from the largest verbatim runs available in `corpus`.
///
/// The chosen run splits the residual into a left and right remainder, which
/// are solved independently; results are emitted left, run, right so the
/// output follows phrase order. Slices no source overlaps become gaps.
pub fn reconstruct(
    corpus: &Corpus,
    phrase: &[String],
    selector: &dyn CandidateSelector,
    rng: &mut dyn RngCore,
) -> Reconstruction {
    let mut out = Reconstruction::default();
    let mut ctx = Context {
        corpus,
        selector,
        rng,
        selections: 0,
    };
    ctx.solve(phrase, 0, 0, &mut out);

    tracing::debug!(
        phrase_len = phrase.len(),
        selections = ctx.selections,
        segments = out.segments.len(),
        gaps = out.gaps.len(),
        "recursion: reconstruction finished"
    );
    debug_assert!(ctx.selections <= phrase.len());
    out
}

struct Context<'a> {
    corpus: &'a Corpus,
    selector: &'a dyn CandidateSelector,
    rng: &'a mut dyn RngCore,
    selections: usize,
}

impl Context<'_> {
    /// `offset` is the position of `residual[0]` in the original phrase.
    fn solve(&mut self, residual: &[String], offset: usize, depth: usize, out: &mut Reconstruction) {
        if residual.is_empty() {
            return;
        }

        let candidates = scan(self.corpus, residual);
        let Some(chosen) = self.selector.select(&candidates, &mut *self.rng) else {
            tracing::debug!(
                offset,
                len = residual.len(),
                depth,
                "recursion: no source overlaps residual slice"
            );
            out.gaps.push(UnmatchedSpan {
                phrase_span: offset..offset + residual.len(),
                tokens: residual.to_vec(),
            });
            return;
        };
        if chosen.length == 0 || chosen.target_span.end > residual.len() {
            // A selector handing back an unusable span would stall the recursion.
            out.gaps.push(UnmatchedSpan {
                phrase_span: offset..offset + residual.len(),
                tokens: residual.to_vec(),
            });
            return;
        }
        self.selections += 1;

        let segment = self.segment_for(chosen, offset);
        tracing::debug!(
            source_id = segment.source_id.as_str(),
            phrase_start = segment.phrase_span.start,
            phrase_end = segment.phrase_span.end,
            length = chosen.length,
            depth,
            "recursion: selected run"
        );
        let (left, right) = split_residual(residual, chosen.target_span.clone());
        let right_offset = offset + chosen.target_span.end;

        self.solve(left, offset, depth + 1, out);
        out.segments.push(segment);
        self.solve(right, right_offset, depth + 1, out);
    }

    fn segment_for(&self, chosen: &MatchCandidate, offset: usize) -> MatchedSegment {
        let times = self
            .corpus
            .get(&chosen.source_id)
            .and_then(|t| segment_times(t, chosen.source_span.clone()));
        let (start_time, end_time) = times.unwrap_or_else(|| {
            tracing::warn!(
                source_id = chosen.source_id.as_str(),
                source_start = chosen.source_span.start,
                source_end = chosen.source_span.end,
                "recursion: no word timings for selected run; using 0.0..0.0"
            );
            (0.0, 0.0)
        });
        MatchedSegment {
            source_id: chosen.source_id.clone(),
            matched_tokens: chosen.matched_tokens.clone(),
            source_span: chosen.source_span.clone(),
            phrase_span: offset + chosen.target_span.start..offset + chosen.target_span.end,
            start_time,
            end_time,
        }
    }
}

/// Start of the first and end of the last recorded word in `span`, or `None`
/// when `transcript.words` does not cover the span.
fn segment_times(transcript: &Transcript, span: Range<usize>) -> Option<(f64, f64)> {
    let first = transcript.words.get(span.start)?;
    let last = transcript.words.get(span.end.checked_sub(1)?)?;
    Some((first.start_time, last.end_time))
}

/// Remainders on either side of a consumed span. Neither includes any token
/// of `consumed`, and `left ++ residual[consumed] ++ right == residual`.
pub fn split_residual<T>(residual: &[T], consumed: Range<usize>) -> (&[T], &[T]) {
    (&residual[..consumed.start], &residual[consumed.end..])
}
