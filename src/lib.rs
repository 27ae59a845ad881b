//! # mtg-sampler
//!
//! Fetches the Magic: The Gathering card catalogue from a paginated public
//! API and draws reproducible, deduplicated samples from it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ CardSource  │──▶│  fetch_all  │──▶│   Sampler    │──▶│   persist   │
//! │ HTTP pages  │   │   Corpus    │   │ (core crate) │   │ {"cards":…} │
//! └─────────────┘   └─────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. A [`fetch::CardSource`] returns one page of schema-less card records.
//! 2. [`fetch::fetch_all`] walks pages serially into a [`models::Corpus`].
//! 3. The core [`Sampler`] draws a seeded sample: every card
//!    carries the required field (default `multiverseid`), no corpus index
//!    repeats, and optionally no `name` repeats.
//! 4. [`persist`] writes the sample as `{"cards": [...]}`, reloads it, and
//!    the CLI reports the reloaded count.
//!
//! ## Quick Start
//!
//! ```bash
//! mtgs collect                      # fetch every page into data/mtg_dataset.json
//! mtgs stats                        # eligible / distinct counts
//! mtgs sample --size 500 --seed 7   # sample the saved dataset
//! mtgs run --max-pages 20           # fetch + sample in one go
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Pages, pagination hints, corpus, on-disk document |
//! | [`fetch`] | `CardSource` trait, HTTP source, paged `fetch_all` |
//! | [`persist`] | JSON dataset/sample read and write |
//! | [`progress`] | Fetch progress on stderr (human or JSON) |
//! | [`collect`] | `mtgs collect` |
//! | [`sample_cmd`] | `mtgs sample` and `mtgs run` |
//! | [`stats`] | `mtgs stats` |

pub mod collect;
pub mod config;
pub mod fetch;
pub mod models;
pub mod persist;
pub mod progress;
pub mod sample_cmd;
pub mod stats;

pub use mtg_sampler_core::{record, sampler};
pub use mtg_sampler_core::{Record, Sample, SampleError, SampleSpec, Sampler};
