

use std::path::PathBuf;

use coursefinder::{CatalogConfig, CatalogService};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("coursefinder=info".parse()?))
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(file) => CatalogConfig::load(Some(file.as_path()))?,
        None => CatalogConfig::from_env()?,
    };
    let service = CatalogService::from_config(config)?;
    let options = service.default_options();

    match service.build_index().await {
        Ok(stats) => info!("Ready: {} records from {} providers", stats.records, stats.providers),
        Err(e) if e.is_retryable() => error!("Initial index build failed, will retry on first question: {}", e),
        Err(e) => return Err(e.into()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match service.query_dataset(question, options).await {
            Ok(result) => {
                let mut json = serde_json::to_string(&result)?;
                json.push('\n');
                stdout.write_all(json.as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(e) => error!("Query {:?} failed: {}", question, e),
        }
    }

    info!("Input closed, cache {:?}", service.cache_stats());
    Ok(())
}
