//! JSON persistence for datasets and samples.
//!
//! Both are stored as a [`CardDocument`], `{"cards": [...]}`, pretty-printed
//! with four-space indentation so the files diff and read well by hand.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mtg_sampler_core::Record;
use serde::Serialize;
use std::path::Path;

use crate::models::{CardDocument, CardDocumentRef};

/// Write `doc` to `path`, creating parent directories as needed.
pub fn write_document(path: &Path, doc: &CardDocumentRef<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let json = to_pretty_json(doc)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write a bare list of records as `{"cards": [...]}`.
pub fn write_cards(path: &Path, cards: &[Record]) -> Result<()> {
    write_document(
        path,
        &CardDocumentRef {
            fetched_at: None,
            cards,
        },
    )
}

/// Write a fetched dataset, stamped with the time it was fetched.
pub fn write_dataset(path: &Path, cards: &[Record], fetched_at: DateTime<Utc>) -> Result<()> {
    write_document(
        path,
        &CardDocumentRef {
            fetched_at: Some(fetched_at),
            cards,
        },
    )
}

pub fn load_document(path: &Path) -> Result<CardDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse card document: {}", path.display()))
}

pub fn load_cards(path: &Path) -> Result<Vec<Record>> {
    Ok(load_document(path)?.cards)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}
