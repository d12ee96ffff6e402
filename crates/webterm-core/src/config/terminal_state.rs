//! Persisted terminal state and the store that owns it.
//!
//! The record is a single JSON blob kept under a fixed key in a key-value
//! medium. The compatibility contract for the blob is small: at most
//! [`MAX_HISTORY_ENTRIES`] history entries, none longer than
//! [`MAX_ENTRY_CHARS`] characters, and records older than [`MAX_AGE_MS`]
//! are discarded on load.

use crate::config::themes::TerminalTheme;
use crate::error::{Result, WebTermError};
use chrono::{DateTime, Local, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Key the terminal state is stored under.
pub const STORAGE_KEY: &str = "terminal_state";
/// History entries kept after a save; older entries are dropped first.
pub const MAX_HISTORY_ENTRIES: usize = 100;
/// History entries longer than this are dropped, not truncated.
pub const MAX_ENTRY_CHARS: usize = 500;
/// Records older than 30 days are expired on load.
pub const MAX_AGE_MS: i64 = 30 * 24 * 60 * 60 * 1000;

const DEFAULT_FONT_SIZE: u16 = 14;

fn default_font_size() -> u16 {
    DEFAULT_FONT_SIZE
}

/// Terminal settings and history persisted across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalState {
    #[serde(default = "default_font_size")]
    pub font_size: u16,
    /// Submitted command lines, most recent last.
    #[serde(default)]
    pub command_history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_output: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<TerminalTheme>,
    /// Epoch milliseconds of the last save.
    pub timestamp: i64,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            command_history: Vec::new(),
            prompt_string: None,
            last_output: None,
            theme: None,
            timestamp: 0,
        }
    }
}

impl TerminalState {
    /// Apply the history policy and stamp the record with `now_ms`.
    pub fn prepared_for_save(&self, now_ms: i64) -> Self {
        let kept: Vec<String> = self
            .command_history
            .iter()
            .filter(|entry| entry.chars().count() <= MAX_ENTRY_CHARS)
            .cloned()
            .collect();
        let skip = kept.len().saturating_sub(MAX_HISTORY_ENTRIES);

        Self {
            command_history: kept.into_iter().skip(skip).collect(),
            timestamp: now_ms,
            ..self.clone()
        }
    }

    /// Time of the last save in the local timezone.
    pub fn saved_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Key-value medium the state record is written to.
pub trait StateBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-process medium with an optional byte quota per value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose value exceeds `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(WebTermError::Storage(format!(
                    "quota exceeded: {} bytes > {} bytes",
                    value.len(),
                    quota
                )));
            }
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// What `debug` reports about the persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSummary {
    pub exists: bool,
    pub font_size: Option<u16>,
    pub history_count: usize,
    pub saved_at: Option<DateTime<Local>>,
}

/// Sole owner of the persisted terminal state.
///
/// Every operation is best-effort: medium failures are logged and the
/// caller sees either a normal return or an absent record.
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn StateBackend>,
    key: String,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").field("key", &self.key).finish()
    }
}

impl StateStore {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn StateBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// A store over a fresh in-memory medium.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn save(&self, state: &TerminalState) {
        self.save_at(state, now_millis());
    }

    /// Write `state` with the history policy applied and `timestamp = now_ms`.
    pub fn save_at(&self, state: &TerminalState, now_ms: i64) {
        let record = state.prepared_for_save(now_ms);
        let content = match serde_json::to_string(&record) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to serialize terminal state: {}", e);
                return;
            }
        };
        match self.backend.write(&self.key, &content) {
            Ok(()) => debug!(
                "Saved terminal state ({} history entries)",
                record.command_history.len()
            ),
            Err(e) => error!("Failed to save terminal state: {}", e),
        }
    }

    pub fn load(&self) -> Option<TerminalState> {
        self.load_at(now_millis())
    }

    /// Read the record as seen at `now_ms`. Expired records are removed.
    pub fn load_at(&self, now_ms: i64) -> Option<TerminalState> {
        self.read_at(now_ms, true)
    }

    fn read_at(&self, now_ms: i64, remove_expired: bool) -> Option<TerminalState> {
        let content = match self.backend.read(&self.key) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to load terminal state: {}", e);
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse terminal state: {}", e);
                return None;
            }
        };

        let timestamp = value
            .as_object()
            .and_then(|obj| obj.get("timestamp"))
            .and_then(serde_json::Value::as_i64)
            .filter(|ts| *ts != 0)?;

        if now_ms.saturating_sub(timestamp) > MAX_AGE_MS {
            if remove_expired {
                info!("Terminal state is older than 30 days, discarding");
                if let Err(e) = self.backend.remove(&self.key) {
                    error!("Failed to remove expired terminal state: {}", e);
                }
            }
            return None;
        }

        match serde_json::from_value(value) {
            Ok(state) => Some(state),
            Err(e) => {
                error!("Failed to parse terminal state: {}", e);
                None
            }
        }
    }

    /// Delete the record. Idempotent.
    pub fn clear(&self) {
        match self.backend.remove(&self.key) {
            Ok(()) => debug!("Cleared terminal state"),
            Err(e) => error!("Failed to clear terminal state: {}", e),
        }
    }

    pub fn summary(&self) -> StateSummary {
        self.summary_at(now_millis())
    }

    /// Describe the record as seen at `now_ms` without touching the medium.
    /// An expired record is reported as absent but left in place.
    pub fn summary_at(&self, now_ms: i64) -> StateSummary {
        match self.read_at(now_ms, false) {
            Some(state) => StateSummary {
                exists: true,
                font_size: Some(state.font_size),
                history_count: state.command_history.len(),
                saved_at: state.saved_at(),
            },
            None => StateSummary {
                exists: false,
                font_size: None,
                history_count: 0,
                saved_at: None,
            },
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;

    fn state_with_history(history: Vec<String>) -> TerminalState {
        TerminalState {
            font_size: 16,
            command_history: history,
            prompt_string: Some("guest>".to_string()),
            ..TerminalState::default()
        }
    }

    #[test]
    fn test_save_then_load_returns_record() {
        let store = StateStore::in_memory();
        let state = TerminalState {
            theme: Some(TerminalTheme::matrix()),
            last_output: Some(vec!["hello".to_string()]),
            ..state_with_history(vec!["help".to_string(), "date".to_string()])
        };

        store.save_at(&state, NOW);
        let loaded = store.load_at(NOW + 1_000).unwrap();

        assert_eq!(loaded, TerminalState { timestamp: NOW, ..state });
    }

    #[test]
    fn test_save_drops_long_entries_before_trimming() {
        let store = StateStore::in_memory();
        let mut history: Vec<String> = (0..120).map(|i| format!("echo {}", i)).collect();
        history.insert(110, "x".repeat(MAX_ENTRY_CHARS + 1));
        history.push("y".repeat(MAX_ENTRY_CHARS));

        store.save_at(&state_with_history(history), NOW);
        let loaded = store.load_at(NOW).unwrap();

        assert_eq!(loaded.command_history.len(), MAX_HISTORY_ENTRIES);
        assert!(loaded
            .command_history
            .iter()
            .all(|e| e.chars().count() <= MAX_ENTRY_CHARS));
        assert_eq!(loaded.command_history[0], "echo 21");
        assert_eq!(loaded.command_history[98], "echo 119");
        assert_eq!(loaded.command_history[99], "y".repeat(MAX_ENTRY_CHARS));
    }

    #[test]
    fn test_entry_length_counts_characters_not_bytes() {
        let entry = "é".repeat(MAX_ENTRY_CHARS);
        let prepared = state_with_history(vec![entry.clone()]).prepared_for_save(NOW);
        assert_eq!(prepared.command_history, vec![entry]);
    }

    #[test]
    fn test_load_missing_record() {
        assert!(StateStore::in_memory().load_at(NOW).is_none());
    }

    #[test]
    fn test_load_expired_record_removes_it() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());
        store.save_at(&state_with_history(vec![]), NOW);

        assert!(store.load_at(NOW + MAX_AGE_MS).is_some());
        assert!(store.load_at(NOW + MAX_AGE_MS + 1).is_none());
        assert!(backend.read(STORAGE_KEY).unwrap().is_none());
        assert!(store.load_at(NOW).is_none());
    }

    #[test]
    fn test_load_extreme_timestamp() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());
        backend
            .write(STORAGE_KEY, &format!(r#"{{"timestamp": {}}}"#, i64::MIN))
            .unwrap();

        assert!(store.load_at(NOW).is_none());
        assert!(backend.read(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_fields_is_absent_but_kept() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());
        let raw = format!(r#"{{"fontSize": "big", "timestamp": {}}}"#, NOW);
        backend.write(STORAGE_KEY, &raw).unwrap();

        assert!(store.load_at(NOW).is_none());
        assert_eq!(backend.read(STORAGE_KEY).unwrap(), Some(raw));
    }

    #[test]
    fn test_load_rejects_structurally_invalid_records() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());

        for raw in [
            "[1, 2, 3]",
            "42",
            r#"{"fontSize": 14, "commandHistory": []}"#,
            r#"{"fontSize": 14, "commandHistory": [], "timestamp": 0}"#,
            "{not json",
        ] {
            backend.write(STORAGE_KEY, raw).unwrap();
            assert!(store.load_at(NOW).is_none(), "accepted {}", raw);
        }
    }

    #[test]
    fn test_load_accepts_minimal_record() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());
        backend
            .write(STORAGE_KEY, &format!(r#"{{"timestamp": {}}}"#, NOW))
            .unwrap();

        let loaded = store.load_at(NOW).unwrap();
        assert_eq!(loaded.font_size, DEFAULT_FONT_SIZE);
        assert!(loaded.command_history.is_empty());
        assert!(loaded.theme.is_none());
    }

    #[test]
    fn test_clear_then_load_is_absent() {
        let store = StateStore::in_memory();
        store.clear();
        assert!(store.load_at(NOW).is_none());

        store.save_at(&state_with_history(vec!["ver".to_string()]), NOW);
        store.clear();
        store.clear();
        assert!(store.load_at(NOW).is_none());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let store = StateStore::new(Arc::new(MemoryBackend::with_quota(16)));
        store.save_at(&state_with_history(vec!["help".to_string()]), NOW);
        assert!(store.load_at(NOW).is_none());
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let store = StateStore::in_memory();
        store.save_at(&state_with_history(vec!["a".to_string()]), NOW);
        store.save_at(&state_with_history(vec!["b".to_string()]), NOW + 5);

        let loaded = store.load_at(NOW + 5).unwrap();
        assert_eq!(loaded.command_history, vec!["b".to_string()]);
        assert_eq!(loaded.timestamp, NOW + 5);
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(Arc::new(FileBackend::new(dir.path().join("state"))));
        store.save_at(&state_with_history(vec!["whoami".to_string()]), NOW);

        let raw = std::fs::read_to_string(dir.path().join("state/terminal_state.json")).unwrap();
        assert!(raw.contains("\"commandHistory\":[\"whoami\"]"));
        assert!(raw.contains(&format!("\"timestamp\":{}", NOW)));

        assert_eq!(store.load_at(NOW).unwrap().font_size, 16);
        store.clear();
        assert!(!dir.path().join("state/terminal_state.json").exists());
    }

    #[test]
    fn test_summary() {
        let store = StateStore::in_memory();
        assert!(!store.summary().exists);

        store.save(&state_with_history(vec!["a".to_string(), "b".to_string()]));
        let summary = store.summary();
        assert!(summary.exists);
        assert_eq!(summary.font_size, Some(16));
        assert_eq!(summary.history_count, 2);
        assert!(summary.saved_at.is_some());
    }

    #[test]
    fn test_summary_leaves_expired_record_in_place() {
        let backend = Arc::new(MemoryBackend::new());
        let store = StateStore::new(backend.clone());
        store.save_at(&state_with_history(vec!["ver".to_string()]), NOW);

        let summary = store.summary_at(NOW + MAX_AGE_MS + 1);
        assert!(!summary.exists);
        assert_eq!(summary.history_count, 0);
        assert!(backend.read(STORAGE_KEY).unwrap().is_some());
        assert!(store.summary_at(NOW).exists);
    }
}
