//! `mtgs collect`: fetch the whole catalogue and save it as a dataset.
//!
//! The flow is fetch all pages, write `{"cards": [...]}`, then reload the file
//! and report how many records it holds. Reloading proves the dataset on disk
//! is readable before any sampling runs against it.

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::fetch::{fetch_all, CardSource, HttpCardSource};
use crate::models::Corpus;
use crate::persist;
use crate::progress::FetchProgressReporter;

/// Fetch every page of `source` and write the result to `path`.
///
/// Returns the corpus that was written and the record count read back.
pub async fn collect_to(
    source: &dyn CardSource,
    max_pages: Option<u32>,
    reporter: &dyn FetchProgressReporter,
    path: &Path,
) -> Result<(Corpus, usize)> {
    let corpus = fetch_all(source, max_pages, reporter).await?;
    info!(
        source = source.name(),
        pages = corpus.pages_fetched,
        records = corpus.len(),
        "fetch complete"
    );

    persist::write_dataset(path, &corpus.records, Utc::now())?;
    let reloaded = persist::load_cards(path)?.len();
    Ok((corpus, reloaded))
}

pub async fn run_collect(
    config: &Config,
    max_pages: Option<u32>,
    output: Option<PathBuf>,
    reporter: &dyn FetchProgressReporter,
) -> Result<()> {
    let source = HttpCardSource::new(&config.api)?;
    let max_pages = max_pages.or(config.api.max_pages);
    let path = output.unwrap_or_else(|| config.dataset.path.clone());

    let (corpus, reloaded) = collect_to(&source, max_pages, reporter, &path).await?;

    println!("dataset: {}", path.display());
    println!("pages: {}", corpus.pages_fetched);
    if let Some(total) = corpus.total_count {
        println!("total count: {}", total);
    }
    println!("records: {}", reloaded);
    Ok(())
}
