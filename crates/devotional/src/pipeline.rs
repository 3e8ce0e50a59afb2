use crate::archive::{ArchiveStore, PersistenceError};
use crate::config::Config;
use crate::fetcher::{Fetch, FetchError, HttpFetcher, fetch_with_retry};
use crate::parser::{ParseError, parse_devotional};
use crate::types::Devotional;
use crate::validate::{ValidationError, validate};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Runs one scrape against the live site.
pub async fn run(config: &Config) -> Result<Devotional, PipelineError> {
    let fetcher = HttpFetcher::new(config)?;
    run_with(&fetcher, config).await
}

/// Fetch, parse, validate and archive a single devotional.
///
/// Nothing is written unless every earlier stage succeeded.
pub async fn run_with<F: Fetch>(fetcher: &F, config: &Config) -> Result<Devotional, PipelineError> {
    log::info!("Starting daily devotional scrape");

    let result = scrape(fetcher, config).await;
    match &result {
        Ok(devotional) => log::info!(
            "Successfully scraped and saved daily devotional: {}",
            devotional.date
        ),
        Err(e) => log::error!("Error scraping devotional: {}", e),
    }
    result
}

async fn scrape<F: Fetch>(fetcher: &F, config: &Config) -> Result<Devotional, PipelineError> {
    let html = fetch_with_retry(fetcher, &config.url, &config.retry).await?;
    let devotional = validate(parse_devotional(&html)?)?;

    ArchiveStore::from_config(config).merge_and_persist(&devotional)?;

    Ok(devotional)
}
