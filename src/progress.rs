//! Fetch progress reporting.
//!
//! Reports observable progress during `mtgs collect` and `mtgs run` so users
//! can see which page is being fetched and how many remain. A full catalogue
//! walk is several hundred serial requests. Progress goes to **stderr** so
//! stdout stays parseable for scripts.

use std::io::Write;

/// A single progress event for a fetch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchProgressEvent {
    /// Fetching `page`; `last_page` is unknown until the first response arrives.
    Fetching {
        source: String,
        page: u32,
        last_page: Option<u32>,
    },
    /// All pages fetched.
    Done {
        source: String,
        pages: u32,
        records: u64,
    },
}

/// Reports fetch progress. Implementations write to stderr (human or JSON).
pub trait FetchProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the fetch loop.
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "fetch cards  page 12 / 623".
pub struct StderrProgress;

impl FetchProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = human_line(&event);
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

fn human_line(event: &FetchProgressEvent) -> String {
    match event {
        FetchProgressEvent::Fetching {
            source,
            page,
            last_page: Some(last),
        } => format!(
            "fetch {}  page {} / {}\n",
            source,
            format_number(*page as u64),
            format_number(*last as u64)
        ),
        FetchProgressEvent::Fetching {
            source,
            page,
            last_page: None,
        } => format!("fetch {}  page {}\n", source, format_number(*page as u64)),
        FetchProgressEvent::Done {
            source,
            pages,
            records,
        } => format!(
            "fetch {}  done  {} records from {} pages\n",
            source,
            format_number(*records),
            format_number(*pages as u64)
        ),
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl FetchProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        let obj = match &event {
            FetchProgressEvent::Fetching {
                source,
                page,
                last_page,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "fetching",
                "page": page,
                "last_page": last_page
            }),
            FetchProgressEvent::Done {
                source,
                pages,
                records,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "done",
                "pages": pages,
                "records": records
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl FetchProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn FetchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
