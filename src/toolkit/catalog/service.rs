use std::sync::Arc;

use tracing::{debug, info};

use super::dataset::{DatasetSource, FileSource};
use super::index::{BuildStats, CatalogRow, IndexBuilder, IndexStatus};
use super::query::{QueryOptions, QueryProcessor, QueryResult, is_in_scope};
use super::search::{CacheStats, QueryCache, RankedEntry, cached_rank};
use super::text::expand_query;
use crate::core::config::CatalogConfig;
use crate::core::error::{CatalogError, Result};


/// Owns one dataset's index and query cache. Independent instances never
/// share state, so several datasets can be served side by side.
pub struct CatalogService {
    config: CatalogConfig,
    builder: IndexBuilder,
    cache: QueryCache<RankedEntry>,
    processor: QueryProcessor,
}

impl CatalogService {
    pub fn new(config: CatalogConfig, source: Arc<dyn DatasetSource>) -> Self {
        info!(
            "Catalog service over {} (cache capacity {})",
            source.describe(),
            config.cache_capacity
        );
        Self {
            builder: IndexBuilder::new(source, config.stream_buffer),
            cache: QueryCache::new(config.cache_capacity),
            processor: QueryProcessor::new(config.summary_preview),
            config,
        }
    }


    pub fn from_config(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let path = config
            .dataset_path
            .clone()
            .ok_or_else(|| CatalogError::Config("dataset_path is not set".to_string()))?;
        Ok(Self::new(config, Arc::new(FileSource::new(path))))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }


    /// Streams and indexes the dataset once; later calls return at once.
    pub async fn build_index(&self) -> Result<BuildStats> {
        let index = self.builder.build_index().await?;
        Ok(index.stats().clone())
    }


    /// Ranked retrieval without intent handling. Text that expands to no
    /// tokens yields no rows and does not touch the index.
    pub async fn find_relevant_data(&self, text: &str, max: usize) -> Result<Vec<CatalogRow>> {
        self.ranked(text, Some(max)).await
    }


    pub async fn query_dataset(&self, text: &str, options: QueryOptions) -> Result<QueryResult> {
        if !is_in_scope(text) {
            debug!("Out of scope: {:?}", text);
            return Ok(QueryResult::general());
        }

        let candidates = self.ranked(text, self.config.candidate_pool).await?;
        Ok(self.processor.answer(text, candidates, options.max))
    }

    /// `None` ranks every candidate the expansion matches.
    async fn ranked(&self, text: &str, max: Option<usize>) -> Result<Vec<CatalogRow>> {
        let tokens = expand_query(text);
        if tokens.is_empty() {
            debug!("Query {:?} expands to nothing", text);
            return Ok(Vec::new());
        }

        let index = self.builder.build_index().await?;
        let max = max.unwrap_or_else(|| index.len());
        Ok(cached_rank(&index, &self.cache, &tokens, self.config.max_cached_results, max))
    }

    pub fn default_options(&self) -> QueryOptions {
        QueryOptions::new(self.config.default_max_results)
    }

    pub fn is_in_scope(&self, text: &str) -> bool {
        is_in_scope(text)
    }


    /// Drops the current index and cache, then streams the dataset again.
    pub async fn rebuild(&self) -> Result<BuildStats> {
        info!("Rebuilding catalog index");
        self.teardown();
        self.build_index().await
    }

    pub fn teardown(&self) {
        self.builder.reset();
        self.cache.clear();
    }

    pub fn index_status(&self) -> IndexStatus {
        self.builder.status()
    }

    pub fn last_error(&self) -> Option<CatalogError> {
        self.builder.last_error()
    }


    pub fn build_stats(&self) -> Result<BuildStats> {
        self.builder
            .ready_index()
            .map(|index| index.stats().clone())
            .ok_or_else(|| {
                CatalogError::IndexNotReady(format!("index is {}", <&str>::from(self.index_status())))
            })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
