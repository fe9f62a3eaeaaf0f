use crate::types::MatchRun;

/// Longest contiguous run shared by `source` and `target`, found by growing a
/// window in place.
///
/// The scan is source-position-major, target-position-minor. Whenever the
/// window at `(i, j)` matches it is recorded and widened by one without moving
/// either pointer; a mismatch advances `j`, and `i` moves on once the window
/// no longer fits in the target at `j`. The window never shrinks, so every
/// recorded run is strictly longer than the previous one.
///
/// Returns `None` when the sequences share no token.
pub fn longest_common_run<S, T>(source: &[S], target: &[T]) -> Option<MatchRun>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let mut best: Option<MatchRun> = None;
    let mut window = 0usize;
    let mut i = 0usize;
    let mut j = 0usize;

    while i + window < source.len() && window < target.len() {
        // Both bounds are checked independently: the window must fit in the
        // source at `i` (loop condition) and in the target at `j`.
        if j + window >= target.len() {
            j = 0;
            i += 1;
            continue;
        }

        if windows_equal(&source[i..=i + window], &target[j..=j + window]) {
            window += 1;
            best = Some(MatchRun {
                source_start: i,
                source_end: i + window,
                target_start: j,
                target_end: j + window,
                length: window,
            });
            continue;
        }

        j += 1;
        if j + window >= target.len() {
            j = 0;
            i += 1;
        }
    }

    best
}

fn windows_equal<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.as_ref() == y.as_ref())
}
