//! Dataset statistics.
//!
//! Summarises a saved dataset: how many records it holds, how many satisfy
//! the sampling predicate, and how many distinct dedup keys those eligible
//! records carry. The last number is the largest sample `mtgs sample` can
//! produce with deduplication on.

use anyhow::Result;
use chrono::{DateTime, Utc};
use mtg_sampler_core::{Record, SampleSpec};
use std::collections::HashSet;
use std::path::Path;

use crate::persist;
use crate::progress::format_number;

/// Counts describing a corpus under one sampling predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub total: usize,
    pub eligible: usize,
    pub distinct_eligible_keys: usize,
}

impl CorpusStats {
    pub fn compute(records: &[Record], require_field: &str, dedup_field: &str) -> Self {
        let eligible: Vec<&Record> = records
            .iter()
            .filter(|r| r.has_field(require_field))
            .collect();
        let distinct_eligible_keys = eligible
            .iter()
            .filter_map(|r| r.key_of(dedup_field))
            .collect::<HashSet<_>>()
            .len();

        Self {
            total: records.len(),
            eligible: eligible.len(),
            distinct_eligible_keys,
        }
    }

    /// Largest feasible sample for `spec`.
    pub fn max_sample(&self, spec: &SampleSpec) -> usize {
        if spec.dedup_field.is_some() {
            self.distinct_eligible_keys
        } else {
            self.eligible
        }
    }
}

/// Run the stats command: load the dataset and print a summary.
pub fn run_stats(input: &Path, spec: &SampleSpec, dedup_field: &str) -> Result<()> {
    let doc = persist::load_document(input)?;
    let stats = CorpusStats::compute(&doc.cards, &spec.require_field, dedup_field);
    let feasible = stats.max_sample(spec);

    println!("mtg-sampler — Dataset Stats");
    println!("===========================");
    println!();
    println!("  Dataset:     {}", input.display());
    if let Some(ts) = doc.fetched_at {
        println!("  Fetched:     {}", format_ts_relative(ts, Utc::now()));
    }
    println!();
    println!("  Records:     {}", format_number(stats.total as u64));
    println!(
        "  Eligible:    {} (with '{}')",
        format_number(stats.eligible as u64),
        spec.require_field
    );
    println!(
        "  Distinct:    {} (eligible, by '{}')",
        format_number(stats.distinct_eligible_keys as u64),
        dedup_field
    );
    println!();
    let verdict = if spec.size <= feasible { "ok" } else { "too large" };
    println!(
        "  Max sample:  {}   (requested {}: {})",
        format_number(feasible as u64),
        format_number(spec.size as u64),
        verdict
    );

    Ok(())
}

fn format_ts_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - ts).num_seconds();
    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}
