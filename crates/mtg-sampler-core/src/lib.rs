//! # mtg-sampler core
//!
//! Pure sampling logic for mtg-sampler: the schema-less [`record::Record`]
//! and the bounded, deduplicating [`sampler::Sampler`].
//!
//! This crate contains no tokio, reqwest, or filesystem I/O. Everything here
//! operates on an already-materialized corpus and a caller-supplied random
//! source, so results are reproducible from a seed.

pub mod record;
pub mod sampler;

pub use record::Record;
pub use sampler::{seeded_rng, IndexSource, Sample, SampleError, SampleSpec, Sampler};
