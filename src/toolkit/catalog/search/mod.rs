pub mod cache;
pub mod retrieval;

pub use cache::{CacheStats, QueryCache};
pub use retrieval::{RankedEntry, cached_rank, rank_candidates, substring_score};
