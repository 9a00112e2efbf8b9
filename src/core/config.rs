use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, Result};

pub const ENV_PREFIX: &str = "COURSEFINDER";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,

    pub cache_capacity: usize,
    pub max_cached_results: usize,
    pub default_max_results: usize,

    /// Caps the ranked candidates `query_dataset` filters and counts over.
    /// Unset means every candidate, so COUNT and aggregates see all matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_pool: Option<usize>,

    /// Providers buffered between the parser thread and the indexer.
    pub stream_buffer: usize,

    pub summary_preview: usize,
}

impl CatalogConfig {

    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: Some(dataset_path.into()),
            ..Self::default()
        }
    }


    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }


    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(CatalogError::Config("cache_capacity must be at least 1".to_string()));
        }
        if self.stream_buffer == 0 {
            return Err(CatalogError::Config("stream_buffer must be at least 1".to_string()));
        }
        if self.candidate_pool == Some(0) {
            return Err(CatalogError::Config("candidate_pool must be at least 1 when set".to_string()));
        }
        if self.max_cached_results == 0 {
            return Err(CatalogError::Config("max_cached_results must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            cache_capacity: crate::DEFAULT_CACHE_CAPACITY,
            max_cached_results: 200,
            default_max_results: crate::DEFAULT_MAX_RESULTS,
            candidate_pool: None,
            stream_buffer: 64,
            summary_preview: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.dataset_path.is_none());
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.candidate_pool, None);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"dataset_path": "/data/providers.json.gz", "cache_capacity": 8, "candidate_pool": 50}}"#).unwrap();
        file.flush().unwrap();

        let config = CatalogConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.dataset_path, Some(PathBuf::from("/data/providers.json.gz")));
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.candidate_pool, Some(50));
        assert_eq!(config.stream_buffer, 64);
    }

    #[test]
    fn test_from_env_reads_prefixed_variables() {
        // SAFETY: no other test reads this variable.
        unsafe { std::env::set_var("COURSEFINDER_SUMMARY_PREVIEW", "5") };
        let config = CatalogConfig::from_env().unwrap();
        unsafe { std::env::remove_var("COURSEFINDER_SUMMARY_PREVIEW") };

        assert_eq!(config.summary_preview, 5);
        assert_eq!(config.cache_capacity, 100);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = CatalogConfig {
            cache_capacity: 0,
            ..CatalogConfig::default()
        };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }
}
