//! Sync progress reporting.
//!
//! Reports what `docmirror sync` is doing page by page. Progress goes to
//! **stderr** so the final summary on stdout stays parseable for scripts.

use std::io::Write;

use doc_mirror_core::filter::FilterStats;

use crate::ingest::PageOutcome;

/// A single progress event for sync.
#[derive(Clone, Debug)]
pub enum SyncProgressEvent {
    /// Listing the document's pages. Total unknown.
    Discovering { doc_id: String },
    /// The hierarchy filter ran; `planned` pages will be processed.
    Filtered { stats: FilterStats, planned: usize },
    /// Page `n` of `total` reached its final state.
    Page {
        n: usize,
        total: usize,
        page_id: String,
        page_name: String,
        outcome: PageOutcome,
    },
}

/// Reports sync progress. Implementations write to stderr (human or JSON).
pub trait SyncProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the sync pipeline.
    fn report(&self, event: SyncProgressEvent);
}

/// Human-friendly progress on stderr: `[3/40] Roadmap  updated`.
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, event: SyncProgressEvent) {
        let line = match &event {
            SyncProgressEvent::Discovering { doc_id } => {
                format!("sync {}  listing pages...\n", doc_id)
            }
            SyncProgressEvent::Filtered { stats, planned } => {
                format!("sync  {}; processing {}\n", stats, planned)
            }
            SyncProgressEvent::Page {
                n,
                total,
                page_name,
                outcome,
                ..
            } => match outcome {
                PageOutcome::Errored(message) => {
                    format!("[{}/{}] {}  errored: {}\n", n, total, page_name, message)
                }
                other => format!("[{}/{}] {}  {}\n", n, total, page_name, other.label()),
            },
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SyncProgressReporter for JsonProgress {
    fn report(&self, event: SyncProgressEvent) {
        let obj = match &event {
            SyncProgressEvent::Discovering { doc_id } => serde_json::json!({
                "event": "progress",
                "doc_id": doc_id,
                "phase": "discovering"
            }),
            SyncProgressEvent::Filtered { stats, planned } => serde_json::json!({
                "event": "progress",
                "phase": "filtered",
                "total": stats.total,
                "subpages_removed": stats.subpages_removed,
                "hidden_removed": stats.hidden_removed,
                "planned": planned
            }),
            SyncProgressEvent::Page {
                n,
                total,
                page_id,
                page_name,
                outcome,
            } => {
                let mut obj = serde_json::json!({
                    "event": "page",
                    "n": n,
                    "total": total,
                    "page_id": page_id,
                    "page_name": page_name,
                    "outcome": outcome.label()
                });
                if let PageOutcome::Errored(message) = outcome {
                    obj["error"] = serde_json::Value::String(message.clone());
                }
                obj
            }
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
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

    /// Parse a `--progress` value: `auto`, `human`, `json` or `off`.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "auto" => Ok(Self::default_for_tty()),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            "off" => Ok(ProgressMode::Off),
            other => Err(format!(
                "invalid progress mode '{}': expected auto, human, json or off",
                other
            )),
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_progress_modes() {
        assert_eq!(ProgressMode::parse("json"), Ok(ProgressMode::Json));
        assert_eq!(ProgressMode::parse("off"), Ok(ProgressMode::Off));
        assert_eq!(ProgressMode::parse("human"), Ok(ProgressMode::Human));
        assert!(ProgressMode::parse("loud").is_err());
    }
}
