pub mod app_config;
pub mod terminal_state;
pub mod themes;

pub use app_config::AppConfig;
pub use terminal_state::{
    FileBackend, MemoryBackend, StateBackend, StateStore, StateSummary, TerminalState,
};
pub use themes::TerminalTheme;
