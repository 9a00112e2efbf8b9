use std::sync::Arc;

use tracing::debug;

use super::cache::QueryCache;
use crate::toolkit::catalog::index::{CatalogIndex, CatalogRow};


/// Ranked rows cached for one expansion, with the depth they were ranked
/// to. Fewer rows than `depth` means every candidate is present.
#[derive(Debug, Clone)]
pub struct RankedEntry {
    depth: usize,
    rows: Arc<[CatalogRow]>,
}

impl RankedEntry {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    /// Whether the first `requested` rows are exactly what a fresh ranking
    /// would return.
    pub fn covers(&self, requested: usize) -> bool {
        requested <= self.depth || self.rows.len() < self.depth
    }
}


/// Sum of non-overlapping substring occurrences of each token in the blob.
pub fn substring_score<S: AsRef<str>>(blob: &str, tokens: &[S]) -> u32 {
    tokens
        .iter()
        .map(|token| {
            let token: &str = token.as_ref();
            blob.matches(token).count() as u32
        })
        .sum()
}


/// OR-union of the tokens' postings, ranked by descending score. Equal
/// scores keep ascending id order, which is stream-arrival order.
pub fn rank_candidates<S: AsRef<str>>(index: &CatalogIndex, tokens: &[S], limit: usize) -> Vec<CatalogRow> {
    let candidates = index.candidates(tokens.iter().map(AsRef::<str>::as_ref));

    let mut scored: Vec<(u32, u32)> = candidates
        .into_iter()
        .filter_map(|id| index.record(id).map(|record| (id, substring_score(record.blob(), tokens))))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);

    scored
        .into_iter()
        .filter_map(|(id, score)| index.record(id).map(|record| record.to_row(score)))
        .collect()
}


pub fn cached_rank(
    index: &CatalogIndex,
    cache: &QueryCache<RankedEntry>,
    tokens: &[String],
    cache_limit: usize,
    max_results: usize,
) -> Vec<CatalogRow> {
    let key = QueryCache::<RankedEntry>::make_key(tokens);

    let entry = match cache.get(&key) {
        Some(entry) if entry.covers(max_results) => {
            debug!("Query cache hit: {}", key);
            entry
        }
        cached => {
            match cached {
                Some(shallow) => debug!(
                    "Cached ranking for {} stops at {} rows, {} requested",
                    key,
                    shallow.depth(),
                    max_results
                ),
                None => debug!("Query cache miss: {}", key),
            }
            let depth = cache_limit.max(max_results);
            let entry = RankedEntry {
                depth,
                rows: rank_candidates(index, tokens, depth).into(),
            };
            cache.set(&key, entry.clone());
            entry
        }
    };

    entry.rows().iter().take(max_results).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::catalog::dataset::FlatRecord;
    use crate::toolkit::catalog::index::RecordDisplay;

    fn index_of(blobs: &[&str]) -> CatalogIndex {
        let mut index = CatalogIndex::new();
        for blob in blobs {
            index.insert(FlatRecord {
                blob: blob.to_string(),
                display: RecordDisplay::default(),
            });
        }
        index
    }

    #[test]
    fn test_substring_score_counts_partial_hits() {
        assert_eq!(substring_score("data science data", &["data"]), 2);
        assert_eq!(substring_score("computing computer", &["comput"]), 2);
        assert_eq!(substring_score("aaaa", &["aa"]), 2);
        assert_eq!(substring_score("law", &["history", "law"]), 1);
    }

    #[test]
    fn test_rank_orders_by_score_then_arrival() {
        let index = index_of(&["law", "data science", "data data", "science"]);
        let rows = rank_candidates(&index, &["data", "science"], 10);
        let ids: Vec<_> = rows.iter().map(|r| (r.id, r.score)).collect();
        assert_eq!(ids, vec![(1, 2), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_rank_truncates() {
        let index = index_of(&["law a", "law b", "law c"]);
        assert_eq!(rank_candidates(&index, &["law"], 2).len(), 2);
        assert!(rank_candidates(&index, &["zzz"], 2).is_empty());
    }

    #[test]
    fn test_cached_rank_recomputes_after_eviction() {
        let index = index_of(&["law", "history", "physics"]);
        let cache = QueryCache::new(2);
        let tokens = |t: &str| vec![t.to_string()];

        cached_rank(&index, &cache, &tokens("law"), 10, 5);
        cached_rank(&index, &cache, &tokens("history"), 10, 5);
        cached_rank(&index, &cache, &tokens("physics"), 10, 5);
        assert!(!cache.contains("law"));

        let before = cache.stats().misses;
        let rows = cached_rank(&index, &cache, &tokens("law"), 10, 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(cache.stats().misses, before + 1);

        cached_rank(&index, &cache, &tokens("law"), 10, 5);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_deeper_request_reranks_truncated_entry() {
        let blobs: Vec<String> = (0..30).map(|i| format!("law option {}", i)).collect();
        let index = index_of(&blobs.iter().map(String::as_str).collect::<Vec<_>>());
        let cache = QueryCache::new(4);
        let tokens = vec!["law".to_string()];

        assert_eq!(cached_rank(&index, &cache, &tokens, 20, 5).len(), 5);
        assert_eq!(cache.get("law").map(|e| e.depth()), Some(20));

        assert_eq!(cached_rank(&index, &cache, &tokens, 20, 25).len(), 25);
        let entry = cache.get("law").unwrap();
        assert_eq!(entry.depth(), 25);
        assert_eq!(entry.rows().len(), 25);

        assert_eq!(cached_rank(&index, &cache, &tokens, 20, 12).len(), 12);
    }

    #[test]
    fn test_complete_entry_serves_any_depth() {
        let index = index_of(&["law a", "law b", "history"]);
        let cache = QueryCache::new(4);
        let tokens = vec!["law".to_string()];

        cached_rank(&index, &cache, &tokens, 10, 5);
        let misses = cache.stats().misses;
        assert_eq!(cached_rank(&index, &cache, &tokens, 10, 500).len(), 2);
        assert_eq!(cache.stats().misses, misses);
        assert_eq!(cache.get("law").map(|e| e.depth()), Some(10));
    }
}
