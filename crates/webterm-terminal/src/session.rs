use crate::dispatcher::{CommandDispatcher, Outcome, TerminalEvent};
use crate::surface::TerminalSurface;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;
use webterm_core::config::terminal_state::MAX_HISTORY_ENTRIES;
use webterm_core::TerminalState;

pub const DEFAULT_PROMPT: &str = "C:\\Users\\guest>";
/// Completed output lines captured into the persisted state.
pub const LAST_OUTPUT_LINES: usize = 50;

/// One interactive terminal: a surface, its dispatcher and the command
/// history, persisted after every submitted line.
pub struct TerminalSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    dispatcher: CommandDispatcher,
    surface: Arc<dyn TerminalSurface>,
    events_tx: mpsc::UnboundedSender<TerminalEvent>,
    history: Vec<String>,
    prompt: String,
}

impl TerminalSession {
    /// Create a session. The receiver yields [`TerminalEvent`]s such as the
    /// delayed exit notification.
    pub fn new(
        dispatcher: CommandDispatcher,
        surface: Arc<dyn TerminalSurface>,
    ) -> (Self, mpsc::UnboundedReceiver<TerminalEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            dispatcher,
            surface,
            events_tx,
            history: Vec::new(),
            prompt: DEFAULT_PROMPT.to_string(),
        };
        (session, events_rx)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Apply the persisted state, if any, to this session and its surface.
    pub fn restore(&mut self) -> Option<TerminalState> {
        let state = self.dispatcher.store().load()?;

        self.history = state.command_history.clone();
        if let Some(ref prompt) = state.prompt_string {
            self.prompt = prompt.clone();
        }
        self.surface.set_font_size_option(state.font_size);
        if let Some(ref theme) = state.theme {
            self.surface.set_theme_option(theme.clone());
        }
        info!(
            "Restored terminal state: {} history entries, font size {}",
            self.history.len(),
            state.font_size
        );
        Some(state)
    }

    /// Record and run one line of input.
    pub fn submit(&mut self, line: &str) -> Outcome {
        let entry = line.trim();
        if !entry.is_empty() {
            self.history.push(entry.to_string());
            let overflow = self.history.len().saturating_sub(MAX_HISTORY_ENTRIES);
            self.history.drain(..overflow);
        }

        let outcome = self
            .dispatcher
            .handle_command(line, &self.surface, &self.events_tx);
        match outcome {
            Outcome::Empty => {}
            Outcome::Handled => self.persist(),
            Outcome::StateCleared => {
                debug!("Persisted state cleared, dropping in-memory history");
                self.history.clear();
            }
        }
        outcome
    }

    fn persist(&self) {
        let options = self.surface.options();
        let state = TerminalState {
            font_size: options.font_size,
            command_history: self.history.clone(),
            prompt_string: Some(self.prompt.clone()),
            last_output: Some(self.surface.recent_lines(LAST_OUTPUT_LINES)),
            theme: options.theme,
            timestamp: 0,
        };
        self.dispatcher.store().save(&state);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::surface::ScrollbackSurface;
    use tokio::runtime::Handle;
    use webterm_core::{StateStore, TerminalTheme};

    fn session_with_store(store: StateStore) -> (TerminalSession, Arc<ScrollbackSurface>) {
        let scrollback = Arc::new(ScrollbackSurface::new(80, 24, 200));
        let dispatcher = CommandDispatcher::new(store, Platform::unavailable(), Handle::current());
        let (session, _events) = TerminalSession::new(dispatcher, scrollback.clone());
        (session, scrollback)
    }

    #[tokio::test]
    async fn test_submit_records_and_persists_history() {
        let store = StateStore::in_memory();
        let (mut session, _surface) = session_with_store(store.clone());

        session.submit("  echo hi ");
        session.submit("");
        session.submit("theme matrix");

        assert_eq!(session.history(), ["echo hi", "theme matrix"]);
        let saved = store.load().unwrap();
        assert_eq!(saved.command_history, vec!["echo hi", "theme matrix"]);
        assert_eq!(saved.theme, Some(TerminalTheme::matrix()));
        assert_eq!(saved.prompt_string.as_deref(), Some(DEFAULT_PROMPT));
        assert!(saved
            .last_output
            .unwrap()
            .contains(&"Theme changed to matrix.".to_string()));
    }

    #[tokio::test]
    async fn test_restore_applies_saved_state() {
        let store = StateStore::in_memory();
        store.save(&TerminalState {
            font_size: 22,
            command_history: vec!["ver".to_string()],
            prompt_string: Some("guest@portfolio:~$".to_string()),
            theme: Some(TerminalTheme::light()),
            ..TerminalState::default()
        });

        let (mut session, surface) = session_with_store(store);
        assert!(session.restore().is_some());
        assert_eq!(session.history(), ["ver"]);
        assert_eq!(session.prompt(), "guest@portfolio:~$");
        assert_eq!(surface.options().font_size, 22);
        assert_eq!(surface.options().theme, Some(TerminalTheme::light()));
    }

    #[tokio::test]
    async fn test_restore_without_saved_state() {
        let (mut session, surface) = session_with_store(StateStore::in_memory());
        assert!(session.restore().is_none());
        assert!(session.history().is_empty());
        assert_eq!(surface.options().font_size, 14);
    }

    #[tokio::test]
    async fn test_reset_is_not_written_back() {
        let store = StateStore::in_memory();
        let (mut session, _surface) = session_with_store(store.clone());
        session.submit("echo one");
        assert!(store.load().is_some());

        assert_eq!(session.submit("reset"), Outcome::StateCleared);
        assert!(store.load().is_none());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_history_is_bounded() {
        let (mut session, _surface) = session_with_store(StateStore::in_memory());
        for i in 0..(MAX_HISTORY_ENTRIES + 5) {
            session.submit(&format!("echo {}", i));
        }
        assert_eq!(session.history().len(), MAX_HISTORY_ENTRIES);
        assert_eq!(session.history()[0], "echo 5");
    }
}
