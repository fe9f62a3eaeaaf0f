use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::types::MatchCandidate;

/// All candidates sharing the maximum run length, in source-id order.
pub fn longest_candidates(candidates: &BTreeMap<String, MatchCandidate>) -> Vec<&MatchCandidate> {
    let Some(max_len) = candidates.values().map(|c| c.length).max() else {
        return Vec::new();
    };
    if max_len == 0 {
        return Vec::new();
    }
    candidates
        .values()
        .filter(|c| c.length == max_len)
        .collect()
}

/// Longest candidate, ties broken uniformly at random with `rng`.
///
/// Zero-length candidates are never selected.
pub fn select_longest<'a>(
    candidates: &'a BTreeMap<String, MatchCandidate>,
    rng: &mut dyn RngCore,
) -> Option<&'a MatchCandidate> {
    let best = longest_candidates(candidates);
    let chosen = best.choose(rng).copied()?;
    if best.len() > 1 {
        tracing::debug!(
            tied = best.len(),
            length = chosen.length,
            selected_source = chosen.source_id.as_str(),
            "selection: broke tie among longest runs"
        );
    }
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn candidate(source_id: &str, length: usize) -> MatchCandidate {
        MatchCandidate {
            source_id: source_id.to_string(),
            matched_tokens: vec!["w".to_string(); length],
            source_span: 0..length,
            target_span: 0..length,
            length,
        }
    }

    fn candidates(entries: &[(&str, usize)]) -> BTreeMap<String, MatchCandidate> {
        entries
            .iter()
            .map(|&(id, len)| (id.to_string(), candidate(id, len)))
            .collect()
    }

    #[test]
    fn empty_map_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_longest(&BTreeMap::new(), &mut rng).is_none());
    }

    #[test]
    fn zero_length_candidates_are_discarded() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = candidates(&[("a", 0), ("b", 0)]);
        assert!(longest_candidates(&map).is_empty());
        assert!(select_longest(&map, &mut rng).is_none());
    }

    #[test]
    fn unique_longest_always_wins() {
        let map = candidates(&[("a", 2), ("b", 4), ("c", 3)]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(select_longest(&map, &mut rng).unwrap().source_id, "b");
        }
    }

    #[test]
    fn ties_only_draw_from_longest_set() {
        let map = candidates(&[("a", 3), ("b", 1), ("c", 3), ("d", 3)]);
        let best: Vec<&str> = longest_candidates(&map)
            .iter()
            .map(|c| c.source_id.as_str())
            .collect();
        assert_eq!(best, ["a", "c", "d"]);

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..600 {
            let chosen = select_longest(&map, &mut rng).unwrap();
            *seen.entry(chosen.source_id.clone()).or_default() += 1;
        }
        assert!(!seen.contains_key("b"));
        for id in ["a", "c", "d"] {
            let count = seen.get(id).copied().unwrap_or(0);
            assert!(count > 100, "{id} chosen only {count} times out of 600");
        }
    }

    #[test]
    fn same_seed_same_choice() {
        let map = candidates(&[("a", 2), ("b", 2), ("c", 2)]);
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            select_longest(&map, &mut rng).unwrap().source_id.clone()
        };
        for seed in 0..10 {
            assert_eq!(pick(seed), pick(seed));
        }
    }
}
