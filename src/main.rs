//! # mtg-sampler CLI (`mtgs`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mtgs collect` | Fetch every page of the card API and save the dataset |
//! | `mtgs sample` | Draw a seeded, deduplicated sample from the saved dataset |
//! | `mtgs run` | Fetch and sample in one process |
//! | `mtgs stats` | Show dataset size and how large a sample it supports |
//!
//! ## Examples
//!
//! ```bash
//! mtgs collect --config ./config/mtgs.toml
//! mtgs sample --size 1000 --seed 42
//! mtgs sample --size 200 --no-dedup --require-field imageUrl
//! RUST_LOG=mtg_sampler=debug mtgs run --max-pages 5 --progress json
//! ```

use clap::{Parser, Subcommand};
use mtg_sampler::config;
use mtg_sampler::progress::ProgressMode;
use mtg_sampler::sample_cmd::SampleOverrides;
use mtg_sampler::{collect, sample_cmd, stats};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// mtg-sampler: fetch the Magic: The Gathering card catalogue and draw
/// reproducible samples from it.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, `./config/mtgs.toml` is used if present, otherwise
/// built-in defaults.
#[derive(Parser)]
#[command(
    name = "mtgs",
    about = "Fetch the Magic: The Gathering card catalogue and draw reproducible samples from it",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Must exist when given.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fetch progress on stderr. Defaults to `human` on a TTY, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by `sample` and `run`.
#[derive(clap::Args)]
struct SampleArgs {
    /// Number of cards to sample.
    #[arg(long)]
    size: Option<usize>,

    /// RNG seed; the same seed and dataset always give the same sample.
    #[arg(long)]
    seed: Option<u64>,

    /// Only cards where this field is present and non-null are eligible.
    #[arg(long)]
    require_field: Option<String>,

    /// Allow several cards with the same name in the sample.
    #[arg(long)]
    no_dedup: bool,
}

impl From<SampleArgs> for SampleOverrides {
    fn from(args: SampleArgs) -> Self {
        SampleOverrides {
            size: args.size,
            seed: args.seed,
            require_field: args.require_field,
            no_dedup: args.no_dedup,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every page of the card API and save it as a dataset.
    ///
    /// Pages are fetched serially. The dataset is written as
    /// `{"cards": [...]}`, reloaded, and its record count printed.
    Collect {
        /// Stop after this many pages.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Dataset path (defaults to `[dataset].path`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Draw a sample from a saved dataset.
    ///
    /// Fails instead of looping when the dataset cannot supply enough
    /// eligible (and, with dedup, distinct-name) cards.
    Sample {
        /// Dataset to read (defaults to `[dataset].path`).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Sample path (defaults to `[sample].path`).
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: SampleArgs,
    },

    /// Fetch the catalogue and sample it in one step.
    Run {
        /// Stop after this many pages.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Do not write the full dataset, only the sample.
        #[arg(long)]
        no_save_dataset: bool,

        #[command(flatten)]
        args: SampleArgs,
    },

    /// Show dataset counts and the largest feasible sample.
    Stats {
        /// Dataset to read (defaults to `[dataset].path`).
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        args: SampleArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_or_default(cli.config.as_deref())?;
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let reporter = progress.reporter();

    match cli.command {
        Commands::Collect { max_pages, output } => {
            collect::run_collect(&cfg, max_pages, output, reporter.as_ref()).await?;
        }
        Commands::Sample {
            input,
            output,
            args,
        } => {
            sample_cmd::run_sample(&cfg, input, output, &args.into())?;
        }
        Commands::Run {
            max_pages,
            no_save_dataset,
            args,
        } => {
            sample_cmd::run_pipeline(
                &cfg,
                max_pages,
                !no_save_dataset,
                &args.into(),
                reporter.as_ref(),
            )
            .await?;
        }
        Commands::Stats { input, args } => {
            let input = input.unwrap_or_else(|| cfg.dataset.path.clone());
            let sample_cfg = SampleOverrides::from(args).apply(&cfg.sample);
            stats::run_stats(&input, &sample_cfg.to_spec(), &sample_cfg.dedup_field)?;
        }
    }

    Ok(())
}
