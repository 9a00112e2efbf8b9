use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use strum::IntoStaticStr;
use tracing::{debug, info, warn};

use super::inverted::CatalogIndex;
use crate::core::error::{CatalogError, Result};
use crate::toolkit::catalog::dataset::{
    DatasetSource, FlattenSkip, ProviderEntry, ProviderStream, flatten_provider,
};

type SharedBuild = Shared<BoxFuture<'static, Result<Arc<CatalogIndex>>>>;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexStatus {
    NotStarted,
    Building,
    Ready,
    Failed,
}

enum BuildState {
    NotStarted,
    Building { generation: u64, build: SharedBuild },
    Ready(Arc<CatalogIndex>),
    Failed(CatalogError),
}

struct BuilderInner {
    state: BuildState,
    generation: u64,
}

impl BuilderInner {
    /// Applies a finished build only if no reset or newer build replaced it.
    fn settle(&mut self, generation: u64, outcome: &Result<Arc<CatalogIndex>>) {
        let current = matches!(
            &self.state,
            BuildState::Building { generation: g, .. } if *g == generation
        );
        if !current {
            debug!("Discarding outcome of superseded build #{}", generation);
            return;
        }
        self.state = match outcome {
            Ok(index) => BuildState::Ready(Arc::clone(index)),
            Err(e) => BuildState::Failed(e.clone()),
        };
    }
}


/// Single-flight owner of the catalog index. The first caller starts the
/// streaming pass on a background task; concurrent callers await the same
/// shared result. A failed pass is cleared so the next call starts afresh.
pub struct IndexBuilder {
    source: Arc<dyn DatasetSource>,
    stream_buffer: usize,
    inner: Arc<Mutex<BuilderInner>>,
    passes: Arc<AtomicUsize>,
}

impl IndexBuilder {
    pub fn new(source: Arc<dyn DatasetSource>, stream_buffer: usize) -> Self {
        Self {
            source,
            stream_buffer,
            inner: Arc::new(Mutex::new(BuilderInner {
                state: BuildState::NotStarted,
                generation: 0,
            })),
            passes: Arc::new(AtomicUsize::new(0)),
        }
    }


    pub async fn build_index(&self) -> Result<Arc<CatalogIndex>> {
        let build = {
            let mut inner = self.inner.lock();
            let pending = match &inner.state {
                BuildState::Ready(index) => return Ok(Arc::clone(index)),
                BuildState::Building { build, .. } => Some(build.clone()),
                BuildState::NotStarted | BuildState::Failed(_) => None,
            };
            match pending {
                Some(build) => build,
                None => self.start_build(&mut inner),
            }
        };

        build.await
    }


    pub fn ready_index(&self) -> Option<Arc<CatalogIndex>> {
        match &self.inner.lock().state {
            BuildState::Ready(index) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    pub fn status(&self) -> IndexStatus {
        match &self.inner.lock().state {
            BuildState::NotStarted => IndexStatus::NotStarted,
            BuildState::Building { .. } => IndexStatus::Building,
            BuildState::Ready(_) => IndexStatus::Ready,
            BuildState::Failed(_) => IndexStatus::Failed,
        }
    }

    pub fn last_error(&self) -> Option<CatalogError> {
        match &self.inner.lock().state {
            BuildState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }


    pub fn passes_started(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }


    /// Drops the index. A build still in flight completes for its awaiting
    /// callers but no longer updates the state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = BuildState::NotStarted;
        info!("Catalog index reset");
    }

    fn start_build(&self, inner: &mut BuilderInner) -> SharedBuild {
        inner.generation += 1;
        let generation = inner.generation;
        self.passes.fetch_add(1, Ordering::SeqCst);
        info!("Starting catalog index build #{} from {}", generation, self.source.describe());

        let source = Arc::clone(&self.source);
        let buffer = self.stream_buffer;
        let task_state = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let outcome = run_build(source.as_ref(), buffer).await.map(Arc::new);
            if let Err(e) = &outcome {
                warn!("Catalog index build #{} failed: {}", generation, e);
            }
            task_state.lock().settle(generation, &outcome);
            outcome
        });

        let join_state = Arc::clone(&self.inner);
        let build = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let outcome = Err(CatalogError::Internal(format!("index build task aborted: {}", e)));
                    join_state.lock().settle(generation, &outcome);
                    outcome
                }
            }
        }
        .boxed()
        .shared();

        inner.state = BuildState::Building {
            generation,
            build: build.clone(),
        };
        build
    }
}


async fn run_build(source: &dyn DatasetSource, stream_buffer: usize) -> Result<CatalogIndex> {
    let started = Instant::now();
    let mut index = CatalogIndex::new();
    let mut stream = ProviderStream::open(source, stream_buffer).await?;

    while let Some(entry) = stream.next().await {
        match entry {
            ProviderEntry::Provider(provider) => {
                index.stats_mut().providers += 1;
                for outcome in flatten_provider(&provider) {
                    match outcome {
                        Ok(flat) => {
                            index.insert(flat);
                        }
                        Err(FlattenSkip::EmptyRecord) => index.stats_mut().empty_records += 1,
                        Err(FlattenSkip::MalformedCourse { course, error }) => {
                            debug!("Skipping malformed course #{} of {:?}: {}", course, provider.name, error);
                            index.stats_mut().malformed_courses += 1;
                        }
                    }
                }
            }
            ProviderEntry::Malformed { position, error } => {
                warn!("Skipping malformed provider at {}: {}", position, error);
                index.stats_mut().malformed_providers += 1;
            }
        }

        tokio::task::yield_now().await;
    }

    let summary = stream.finish().await?;
    index.set_root_shape(summary.shape);

    let records = index.len();
    let tokens = index.token_count();
    let stats = index.stats_mut();
    stats.records = records;
    stats.tokens = tokens;
    stats.elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        "Catalog index ready: {} providers, {} records, {} tokens, {} malformed providers, {} malformed courses, {} empty records in {}ms",
        stats.providers,
        stats.records,
        stats.tokens,
        stats.malformed_providers,
        stats.malformed_courses,
        stats.empty_records,
        stats.elapsed_ms
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::catalog::dataset::{DatasetReader, MemorySource, RootShape};
    use async_trait::async_trait;
    use serde_json::json;

    struct CountingSource {
        inner: MemorySource,
        opens: AtomicUsize,
    }

    impl CountingSource {
        fn new(bytes: impl Into<Vec<u8>>) -> Self {
            Self {
                inner: MemorySource::new(bytes),
                opens: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DatasetSource for CountingSource {
        async fn open(&self) -> Result<DatasetReader> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.inner.open().await
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    /// Serves a broken document on the first open and a valid one afterwards.
    struct FlakySource {
        opens: AtomicUsize,
    }

    #[async_trait]
    impl DatasetSource for FlakySource {
        async fn open(&self) -> Result<DatasetReader> {
            let attempt = self.opens.fetch_add(1, Ordering::SeqCst);
            let body = if attempt == 0 {
                r#"[{"name": "Uni", "courses": [{"courseTitle": "Law"}]}, {"na"#.to_string()
            } else {
                sample().to_string()
            };
            MemorySource::new(body).open().await
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn sample() -> serde_json::Value {
        json!([
            { "name": "Uni A", "courses": [
                { "courseTitle": "Law", "options": [{}, {}] },
                { "courseTitle": 12 }
            ]},
            "not a provider",
            { "name": "Uni B", "courses": [{ "courseTitle": "History" }] }
        ])
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_pass() {
        let source = Arc::new(CountingSource::new(sample().to_string()));
        let builder = IndexBuilder::new(source.clone(), 4);

        let results = futures::future::join_all((0..8).map(|_| builder.build_index())).await;
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }

        builder.build_index().await.unwrap();
        assert_eq!(source.opens.load(Ordering::SeqCst), 1);
        assert_eq!(builder.passes_started(), 1);
        assert_eq!(builder.status(), IndexStatus::Ready);
    }

    #[tokio::test]
    async fn test_build_stats_and_arrival_order() {
        let builder = IndexBuilder::new(Arc::new(MemorySource::from_json(&sample())), 1);
        let index = builder.build_index().await.unwrap();

        let titles: Vec<_> = index
            .records()
            .iter()
            .map(|r| (r.id, r.display.title().to_string()))
            .collect();
        assert_eq!(
            titles,
            vec![(0, "Law".to_string()), (1, "Law".to_string()), (2, "History".to_string())]
        );

        let stats = index.stats();
        assert_eq!(stats.providers, 2);
        assert_eq!(stats.malformed_providers, 1);
        assert_eq!(stats.malformed_courses, 1);
        assert_eq!(stats.records, 3);
        assert_eq!(index.root_shape(), Some(RootShape::Array));
    }

    #[tokio::test]
    async fn test_failed_build_is_cleared_for_retry() {
        let source = Arc::new(FlakySource { opens: AtomicUsize::new(0) });
        let builder = IndexBuilder::new(source.clone(), 2);

        let (a, b) = tokio::join!(builder.build_index(), builder.build_index());
        assert!(matches!(a, Err(CatalogError::StreamFailure(_))));
        assert_eq!(a.err(), b.err());
        assert_eq!(builder.status(), IndexStatus::Failed);
        assert!(builder.last_error().is_some());

        let index = builder.build_index().await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(source.opens.load(Ordering::SeqCst), 2);
        assert_eq!(builder.status(), IndexStatus::Ready);
    }

    #[tokio::test]
    async fn test_reset_forces_new_pass() {
        let source = Arc::new(CountingSource::new("[]"));
        let builder = IndexBuilder::new(source.clone(), 2);

        assert!(builder.build_index().await.unwrap().is_empty());
        builder.reset();
        assert_eq!(builder.status(), IndexStatus::NotStarted);
        assert!(builder.ready_index().is_none());

        builder.build_index().await.unwrap();
        assert_eq!(source.opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_caller_does_not_cancel_build() {
        let source = Arc::new(CountingSource::new(sample().to_string()));
        let builder = IndexBuilder::new(source.clone(), 2);

        let abandoned = tokio::time::timeout(std::time::Duration::from_millis(1), builder.build_index()).await;
        assert!(abandoned.is_err());

        let index = builder.build_index().await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(source.opens.load(Ordering::SeqCst), 1);
    }
}
