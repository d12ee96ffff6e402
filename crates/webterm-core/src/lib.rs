pub mod config;
pub mod error;

pub use config::{AppConfig, StateStore, TerminalState, TerminalTheme};
pub use error::{Result, WebTermError};

/// Application version, resolved at compile time from the workspace Cargo.toml.
/// Use this constant everywhere instead of calling `env!("CARGO_PKG_VERSION")` directly.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
