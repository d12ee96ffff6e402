mod console;
mod host;
mod input;
mod system;

use anyhow::Result;
use console::ConsoleSurface;
use host::LocalHost;
use std::sync::Arc;
use system::{SystemBrowser, SystemClipboard};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;
use webterm_core::config::app_config::AppConfig;
use webterm_core::config::terminal_state::FileBackend;
use webterm_core::{StateStore, VERSION};
use webterm_terminal::{
    CommandDispatcher, Platform, TerminalEvent, TerminalSession, TerminalSurface,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with terminal output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("webterm=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting WebTerm v{}", VERSION);

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let data_dir = config.data_dir();
    tracing::info!("Terminal state stored in {}", data_dir.display());
    let store = StateStore::with_key(
        Arc::new(FileBackend::new(data_dir)),
        config.storage.state_key.clone(),
    );

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let surface = Arc::new(ConsoleSurface::stdout(cols, rows, &config.terminal));
    let host = Arc::new(LocalHost::new(
        surface.clone(),
        store.clone(),
        config.terminal.clone(),
    ));
    let platform = Platform::new(Arc::new(SystemClipboard), Arc::new(SystemBrowser));
    let dispatcher = CommandDispatcher::new(store, platform, Handle::current()).with_host(host);

    let (session, mut events) = TerminalSession::new(dispatcher, surface.clone());
    let mut session = session.with_prompt(config.terminal.prompt.clone());
    session.restore();

    surface.write_line(&format!("WebTerm [Version {}]", VERSION));
    surface.write_line("Type 'help' to see available commands.");
    surface.write_line("");

    let mut lines = input::spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
    loop {
        surface.show_prompt(session.prompt());
        tokio::select! {
            line = lines.recv() => match line.transpose()? {
                Some(line) => {
                    surface.record_input(session.prompt(), &line);
                    session.submit(&line);
                }
                None => {
                    surface.write_line("");
                    break;
                }
            },
            Some(TerminalEvent::Exit) = events.recv() => {
                surface.write_line("");
                tracing::info!("Exit requested, leaving terminal mode");
                break;
            }
        }
    }

    session.dispatcher_mut().cancel_pending_exit();
    Ok(())
}
