//! Sampling CLI commands: `sample` and `run`.
//!
//! `mtgs sample` draws from a saved dataset. `mtgs run` fetches the
//! catalogue and samples it in one process, optionally saving the full
//! dataset along the way. Both write the sample, reload it, and print the
//! reloaded count.

use anyhow::{bail, Context, Result};
use mtg_sampler_core::{seeded_rng, Record, Sample, Sampler};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::collect;
use crate::config::{Config, SampleConfig};
use crate::fetch::{fetch_all, HttpCardSource};
use crate::persist;
use crate::progress::FetchProgressReporter;

/// Command-line overrides for the `[sample]` config section.
#[derive(Debug, Clone, Default)]
pub struct SampleOverrides {
    pub size: Option<usize>,
    pub seed: Option<u64>,
    pub require_field: Option<String>,
    pub no_dedup: bool,
}

impl SampleOverrides {
    pub fn apply(&self, base: &SampleConfig) -> SampleConfig {
        let mut cfg = base.clone();
        if let Some(size) = self.size {
            cfg.size = size;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(field) = &self.require_field {
            cfg.require_field = field.clone();
        }
        if self.no_dedup {
            cfg.dedup = false;
        }
        cfg
    }
}

/// Draw a seeded sample from `records` as configured by `cfg`.
pub fn draw_sample(records: &[Record], cfg: &SampleConfig) -> Result<Sample> {
    let sampler = Sampler::new(cfg.to_spec());
    let sample = sampler
        .sample(records, &mut seeded_rng(cfg.seed))
        .with_context(|| format!("Failed to sample {} records (seed {})", cfg.size, cfg.seed))?;

    let rejected = sample.rejections();
    debug!(
        accepted = sample.len(),
        attempts = sample.attempts(),
        duplicate_index = rejected.duplicate_index,
        ineligible = rejected.ineligible,
        duplicate_key = rejected.duplicate_key,
        "sampling complete"
    );
    Ok(sample)
}

/// Sample `records`, write the result to `path`, and return the reloaded count.
pub fn sample_to(records: &[Record], cfg: &SampleConfig, path: &Path) -> Result<usize> {
    let sample = draw_sample(records, cfg)?;
    let expected = sample.len();
    persist::write_cards(path, sample.records())?;

    let reloaded = persist::load_cards(path)?.len();
    if reloaded != expected {
        bail!(
            "{} holds {} records after writing {}",
            path.display(),
            reloaded,
            expected
        );
    }
    Ok(reloaded)
}

pub fn run_sample(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: &SampleOverrides,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.dataset.path.clone());
    let output = output.unwrap_or_else(|| config.sample.path.clone());
    let cfg = overrides.apply(&config.sample);

    let records = persist::load_cards(&input)?;
    let count = sample_to(&records, &cfg, &output)?;

    println!("corpus: {}", records.len());
    println!("sample: {}", output.display());
    println!("sampled: {}", count);
    Ok(())
}

/// Fetch the catalogue, then sample it.
///
/// When `save_dataset` is set the full corpus is also written to the
/// configured dataset path, exactly as `mtgs collect` would.
pub async fn run_pipeline(
    config: &Config,
    max_pages: Option<u32>,
    save_dataset: bool,
    overrides: &SampleOverrides,
    reporter: &dyn FetchProgressReporter,
) -> Result<()> {
    let source = HttpCardSource::new(&config.api)?;
    let max_pages = max_pages.or(config.api.max_pages);
    let cfg = overrides.apply(&config.sample);

    let records = if save_dataset {
        let (corpus, reloaded) =
            collect::collect_to(&source, max_pages, reporter, &config.dataset.path).await?;
        println!("dataset: {}", config.dataset.path.display());
        println!("records: {}", reloaded);
        corpus.records
    } else {
        fetch_all(&source, max_pages, reporter).await?.records
    };

    let count = sample_to(&records, &cfg, &config.sample.path)?;
    println!("corpus: {}", records.len());
    println!("sample: {}", config.sample.path.display());
    println!("sampled: {}", count);
    Ok(())
}
