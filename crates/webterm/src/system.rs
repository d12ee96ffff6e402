use async_trait::async_trait;
use webterm_terminal::platform::{Clipboard, UrlOpener};
use webterm_terminal::{Result, TerminalError};

/// The desktop clipboard, accessed off the async runtime.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: String) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new().map_err(|e| {
                TerminalError::Clipboard(format!("failed to access clipboard: {}", e))
            })?;
            clipboard
                .set_text(text)
                .map_err(|e| TerminalError::Clipboard(format!("failed to copy: {}", e)))
        })
        .await
        .map_err(|e| TerminalError::Clipboard(format!("clipboard task failed: {}", e)))?
    }
}

/// Opens URLs with the platform's default browser.
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| TerminalError::Browser(e.to_string()))
    }
}
