use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Analytics notification emitted by the wizard; never blocking, best effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub session_id: String,
    pub at: i64,
}

impl AnalyticsEvent {
    pub fn now(session_id: &str, stage: &str, action: &str) -> Self {
        Self {
            name: format!("{stage}:{action}"),
            session_id: session_id.to_string(),
            at: Utc::now().timestamp(),
        }
    }
}

pub trait AnalyticsSink {
    fn record(&mut self, event: AnalyticsEvent);
}

/// Discards every event; the default sink for hosts without analytics.
#[derive(Debug, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&mut self, _event: AnalyticsEvent) {}
}

/// Keeps events in memory, used by tests and by hosts that batch uploads.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<AnalyticsEvent>,
}

impl MemorySink {
    pub fn event_names(&self) -> Vec<String> {
        self.events.iter().map(|event| event.name.clone()).collect()
    }
}

impl AnalyticsSink for MemorySink {
    fn record(&mut self, event: AnalyticsEvent) {
        self.events.push(event);
    }
}

pub fn analytics_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/wizard-analytics.jsonl")
}

/// Appends one JSONL line per event under the state root. Failures are
/// swallowed: losing an analytics line must never disturb the wizard.
#[derive(Debug)]
pub struct FileSink {
    state_root: PathBuf,
}

impl FileSink {
    pub fn new(state_root: &Path) -> Self {
        Self {
            state_root: state_root.to_path_buf(),
        }
    }
}

impl AnalyticsSink for FileSink {
    fn record(&mut self, event: AnalyticsEvent) {
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        let path = analytics_log_path(&self.state_root);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(format!("{line}\n").as_bytes()));
    }
}
