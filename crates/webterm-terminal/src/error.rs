use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
