//! System integrations used by commands: the clipboard and a browser.

use crate::{Result, TerminalError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: String) -> Result<()>;
}

pub trait UrlOpener: Send + Sync {
    /// Open `url` in a new browsing context.
    fn open_url(&self, url: &str) -> Result<()>;
}

/// The clipboard and URL opener handed to the dispatcher.
#[derive(Clone)]
pub struct Platform {
    pub clipboard: Arc<dyn Clipboard>,
    pub opener: Arc<dyn UrlOpener>,
}

impl Platform {
    pub fn new(clipboard: Arc<dyn Clipboard>, opener: Arc<dyn UrlOpener>) -> Self {
        Self { clipboard, opener }
    }

    /// A platform where every integration fails as unavailable.
    pub fn unavailable() -> Self {
        Self::new(Arc::new(Unavailable), Arc::new(Unavailable))
    }
}

struct Unavailable;

#[async_trait]
impl Clipboard for Unavailable {
    async fn write_text(&self, _text: String) -> Result<()> {
        Err(TerminalError::Clipboard("no clipboard on this platform".to_string()))
    }
}

impl UrlOpener for Unavailable {
    fn open_url(&self, _url: &str) -> Result<()> {
        Err(TerminalError::Browser("no browser on this platform".to_string()))
    }
}

/// Clipboard that keeps the last written text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: String) -> Result<()> {
        *self.contents.lock() = Some(text);
        Ok(())
    }
}

/// Opener that records requested URLs instead of launching anything.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}
