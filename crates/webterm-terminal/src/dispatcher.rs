//! The built-in command table.
//!
//! [`CommandDispatcher::handle_command`] takes one submitted line, looks the
//! command up and performs its side effect on the surface, the host
//! capabilities or the state store. Every failure ends as a line of output;
//! nothing propagates to the caller.

use crate::host::{DecorationOptions, TerminalHost};
use crate::parser::CommandLine;
use crate::platform::Platform;
use crate::surface::TerminalSurface;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webterm_core::{StateStore, TerminalTheme, VERSION};

/// Delay between the `exit` message and the exit notification.
pub const EXIT_DELAY: Duration = Duration::from_millis(800);
pub const MIN_FONT_SIZE: u16 = 6;
pub const MAX_FONT_SIZE: u16 = 36;
pub const GITHUB_URL: &str = "https://github.com/webterm";
/// Renderer add-ons the web terminal loads, reported by `debug`.
pub const KNOWN_ADDONS: &[&str] = &[
    "fit",
    "web-links",
    "search",
    "webgl",
    "clipboard",
    "image",
    "serialize",
];

const WHOAMI: &str = "portfolio\\guest";

const HELP: &[(&str, &str)] = &[
    ("help", "Show this help message"),
    ("cls, clear", "Clear terminal screen"),
    ("echo [text]", "Print text"),
    ("date", "Show the current date and time"),
    ("whoami", "Show the current user"),
    ("ver", "Show version information"),
    ("history", "List saved command history"),
    ("theme [name]", "Switch color theme (dark, light, matrix)"),
    ("fontsize [n]", "Set font size (6-36)"),
    ("fit", "Resize terminal to fit its container"),
    ("search [text]", "Search terminal output"),
    ("export", "Copy terminal content to the clipboard"),
    ("decorate", "Decorate the current line"),
    ("webgl", "Show renderer acceleration status"),
    ("link", "Show clickable link support"),
    ("image", "Show inline image support"),
    ("github", "Open GitHub profile"),
    ("debug", "Show terminal diagnostics"),
    ("reset", "Reset terminal settings"),
    ("exit", "Switch to GUI mode"),
];

/// Signals sent to whoever embeds the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Leave the terminal and return to the graphical page.
    Exit,
}

/// What a call to [`CommandDispatcher::handle_command`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line was blank; nothing ran.
    Empty,
    Handled,
    /// The persisted state was cleared and must not be written back.
    StateCleared,
}

pub struct CommandDispatcher {
    store: StateStore,
    platform: Platform,
    runtime: Handle,
    host: Option<Arc<dyn TerminalHost>>,
    pending_exit: Option<JoinHandle<()>>,
}

impl CommandDispatcher {
    pub fn new(store: StateStore, platform: Platform, runtime: Handle) -> Self {
        Self {
            store,
            platform,
            runtime,
            host: None,
            pending_exit: None,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn TerminalHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Register or replace the host capability handle.
    pub fn set_host(&mut self, host: Arc<dyn TerminalHost>) {
        self.host = Some(host);
    }

    pub fn clear_host(&mut self) {
        self.host = None;
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Abort a scheduled exit notification. Returns whether one was pending.
    pub fn cancel_pending_exit(&mut self) -> bool {
        match self.pending_exit.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    /// Run one line of input against the command table.
    pub fn handle_command(
        &mut self,
        line: &str,
        surface: &Arc<dyn TerminalSurface>,
        events: &UnboundedSender<TerminalEvent>,
    ) -> Outcome {
        let Some(cmd) = CommandLine::parse(line) else {
            return Outcome::Empty;
        };
        debug!(command = %cmd.command, args = cmd.arguments.len(), "Dispatching command");

        match cmd.command.as_str() {
            "exit" => self.exit(surface, events),
            "cls" | "clear" => surface.clear(),
            "echo" => {
                if cmd.arguments.is_empty() {
                    surface.write_line("ECHO is on.");
                } else {
                    surface.write_line(&cmd.joined_arguments());
                }
            }
            "date" => {
                let now = Local::now();
                surface.write_line(&now.format("%a %b %d %Y %H:%M:%S").to_string());
            }
            "search" => self.search(&cmd, surface.as_ref()),
            "export" => self.export(surface),
            "github" => self.github(surface.as_ref()),
            "whoami" => surface.write_line(WHOAMI),
            "ver" => {
                surface.write_line(&format!("WebTerm [Version {}]", VERSION));
                surface.write_line("(c) WebTerm Contributors. All rights reserved.");
            }
            "fontsize" => self.font_size(&cmd, surface.as_ref()),
            "fit" => self.fit(surface.as_ref()),
            "webgl" => self.webgl(surface.as_ref()),
            "link" => {
                surface.write_line("Links in terminal output are clickable:");
                surface.write_line(&format!("  GitHub: {}", GITHUB_URL));
                surface.write_line("  Docs:   https://xtermjs.org/docs/");
            }
            "image" => {
                surface.write_line("Inline images are supported through the image add-on.");
                surface.write_line("Sixel graphics and the iTerm2 inline image protocol can be rendered.");
            }
            "theme" => self.theme(&cmd, surface.as_ref()),
            "decorate" => self.decorate(surface.as_ref()),
            "reset" => return self.reset(surface.as_ref()),
            "debug" => self.debug(surface.as_ref()),
            "history" => self.history(surface.as_ref()),
            "help" => {
                surface.write_line("Available commands:");
                for (usage, description) in HELP {
                    surface.write_line(&format!("  {:<14} - {}", usage, description));
                }
            }
            other => surface.write_line(&format!(
                "'{}' is not recognized as an internal or external command.",
                other
            )),
        }
        Outcome::Handled
    }

    fn exit(&mut self, surface: &Arc<dyn TerminalSurface>, events: &UnboundedSender<TerminalEvent>) {
        surface.write_line("Switching to GUI mode...");
        if let Some(previous) = self.pending_exit.take() {
            previous.abort();
        }
        let events = events.clone();
        self.pending_exit = Some(self.runtime.spawn(async move {
            tokio::time::sleep(EXIT_DELAY).await;
            if events.send(TerminalEvent::Exit).is_err() {
                debug!("Exit listener dropped before notification");
            }
        }));
    }

    fn search(&self, cmd: &CommandLine, surface: &dyn TerminalSurface) {
        if cmd.arguments.is_empty() {
            surface.write_line("Usage: search <text>");
            return;
        }
        let term = cmd.joined_arguments();
        match self.host.as_deref().and_then(|h| h.search()) {
            Some(search) => match search.search_for(&term) {
                Ok(true) => surface.write_line(&format!("Found '{}'.", term)),
                Ok(false) => surface.write_line(&format!("No matches for '{}'.", term)),
                Err(e) => surface.write_line(&format!("Search failed: {}", e)),
            },
            None => {
                surface.write_line("Search is not available in this terminal.");
                surface.write_line("Use your browser's find (Ctrl+F) to search the page.");
            }
        }
    }

    fn export(&self, surface: &Arc<dyn TerminalSurface>) {
        let Some(exporter) = self.host.as_deref().and_then(|h| h.export()) else {
            surface.write_line("Export is not available in this terminal.");
            return;
        };
        let content = match exporter.export_content() {
            Ok(content) => content,
            Err(e) => {
                warn!("Terminal export failed: {}", e);
                surface.write_line(&format!("Export failed: {}", e));
                return;
            }
        };

        surface.write_line("Copying terminal content to clipboard...");
        let clipboard = self.platform.clipboard.clone();
        let surface = Arc::clone(surface);
        let chars = content.chars().count();
        self.runtime.spawn(async move {
            match clipboard.write_text(content).await {
                Ok(()) => surface.write_line(&format!(
                    "Terminal content copied to clipboard ({} characters).",
                    chars
                )),
                Err(e) => {
                    warn!("Clipboard write failed: {}", e);
                    surface.write_line(&format!("Failed to copy to clipboard: {}", e));
                }
            }
        });
    }

    fn github(&self, surface: &dyn TerminalSurface) {
        surface.write_line(&format!("Opening {} ...", GITHUB_URL));
        if let Err(e) = self.platform.opener.open_url(GITHUB_URL) {
            warn!("Failed to open {}: {}", GITHUB_URL, e);
            surface.write_line(&format!("Could not open browser: {}", e));
        }
    }

    fn font_size(&self, cmd: &CommandLine, surface: &dyn TerminalSurface) {
        let Some(arg) = cmd.first_argument() else {
            surface.write_line(&format!("Current font size: {}", surface.options().font_size));
            surface.write_line(&format!("Usage: fontsize <{}-{}>", MIN_FONT_SIZE, MAX_FONT_SIZE));
            return;
        };
        let Ok(requested) = arg.parse::<i64>() else {
            surface.write_line(&format!("Invalid font size '{}'. Please enter a number.", arg));
            return;
        };
        if requested < i64::from(MIN_FONT_SIZE) || requested > i64::from(MAX_FONT_SIZE) {
            surface.write_line(&format!(
                "Font size must be between {} and {}.",
                MIN_FONT_SIZE, MAX_FONT_SIZE
            ));
            return;
        }
        // In range, so the narrowing cannot truncate.
        let size = requested as u16;

        match self.host.as_deref().and_then(|h| h.font_size()) {
            Some(control) => match control.set_font_size(size) {
                Ok(()) => surface.write_line(&format!("Font size set to {}.", size)),
                Err(e) => surface.write_line(&format!("Failed to set font size: {}", e)),
            },
            None => surface.write_line("Font size control is not available."),
        }
    }

    fn fit(&self, surface: &dyn TerminalSurface) {
        match self.host.as_deref().and_then(|h| h.fit()) {
            Some(fit) => match fit.fit_to_container() {
                Ok((cols, rows)) => {
                    surface.write_line(&format!("Terminal resized to {} cols x {} rows.", cols, rows))
                }
                Err(e) => surface.write_line(&format!("Fit failed: {}", e)),
            },
            None => surface.write_line("Fit is not available in this terminal."),
        }
    }

    fn webgl(&self, surface: &dyn TerminalSurface) {
        let line = match self.host.as_deref().and_then(|h| h.renderer()) {
            Some(renderer) if renderer.is_accelerated() => "WebGL renderer: active (GPU accelerated)",
            Some(_) => "WebGL renderer: inactive (using canvas fallback)",
            None => "WebGL renderer: status unknown (no renderer information)",
        };
        surface.write_line(line);
    }

    fn theme(&self, cmd: &CommandLine, surface: &dyn TerminalSurface) {
        let requested = cmd.first_argument();
        let Some(theme) = requested.and_then(TerminalTheme::find) else {
            if let Some(name) = requested {
                surface.write_line(&format!("Unknown theme '{}'.", name));
            }
            surface.write_line(&format!(
                "Available themes: {}",
                TerminalTheme::builtin_names().join(", ")
            ));
            surface.write_line("Usage: theme <name>");
            return;
        };

        match self.host.as_deref().and_then(|h| h.theme()) {
            Some(control) => {
                if let Err(e) = control.set_theme(&theme) {
                    surface.write_line(&format!("Failed to apply theme: {}", e));
                    return;
                }
            }
            None => surface.set_theme_option(theme.clone()),
        }
        info!("Theme changed to {}", theme.name);
        surface.write_line(&format!("Theme changed to {}.", theme.name));
    }

    fn decorate(&self, surface: &dyn TerminalSurface) {
        let Some(marker) = surface.register_marker() else {
            surface.write_line("Could not register a marker at the cursor line.");
            return;
        };
        surface.write_line("This line has been decorated.");

        let Some(decorations) = self.host.as_deref().and_then(|h| h.decorations()) else {
            surface.write_line("Decorations are not available in this terminal.");
            return;
        };
        let options = DecorationOptions {
            background_color: Some("#e5c07b".to_string()),
            ..DecorationOptions::default()
        };
        match decorations.add_decoration(marker, options) {
            Ok(()) => surface.write_line(&format!("Decoration added at line {}.", marker.line)),
            Err(e) => surface.write_line(&format!("Failed to add decoration: {}", e)),
        }
    }

    fn reset(&self, surface: &dyn TerminalSurface) -> Outcome {
        if let Some(reset) = self.host.as_deref().and_then(|h| h.reset()) {
            return match reset.reset_terminal() {
                Ok(()) => {
                    surface.write_line("Terminal reset to defaults.");
                    Outcome::StateCleared
                }
                Err(e) => {
                    surface.write_line(&format!("Reset failed: {}", e));
                    Outcome::Handled
                }
            };
        }

        self.store.clear();
        surface.write_line("Saved terminal state cleared.");
        surface.write_line("Current font size and theme stay in effect until the terminal is reloaded.");
        Outcome::StateCleared
    }

    fn debug(&self, surface: &dyn TerminalSurface) {
        let options = surface.options();
        let (cols, rows) = surface.dimensions();
        let summary = self.store.summary();

        surface.write_line("Terminal debug information:");
        surface.write_line(&format!("  Font family: {}", options.font_family));
        surface.write_line(&format!("  Font size:   {}", options.font_size));
        match options.theme {
            Some(ref theme) => {
                surface.write_line(&format!("  Theme:       {}", theme.name));
                surface.write_line(&format!("    background: {}", theme.background));
                surface.write_line(&format!("    foreground: {}", theme.foreground));
                surface.write_line(&format!("    cursor:     {}", theme.cursor));
                surface.write_line(&format!("    selection:  {}", theme.selection_background));
                for (slot, color) in theme.palette() {
                    surface.write_line(&format!("    {}: {}", slot, color));
                }
            }
            None => surface.write_line("  Theme:       (renderer default)"),
        }
        surface.write_line(&format!("  Viewport:    {} cols x {} rows", cols, rows));

        if summary.exists {
            surface.write_line("  Saved state: present");
            if let Some(size) = summary.font_size {
                surface.write_line(&format!("    font size: {}", size));
            }
            surface.write_line(&format!("    history:   {} entries", summary.history_count));
            if let Some(saved_at) = summary.saved_at {
                surface.write_line(&format!(
                    "    saved at:  {}",
                    saved_at.format("%Y-%m-%d %H:%M:%S")
                ));
            }
        } else {
            surface.write_line("  Saved state: none");
        }

        match self.host {
            Some(ref host) => surface.write_line(&format!(
                "  Host:        connected ({})",
                host.capability_names().join(", ")
            )),
            None => surface.write_line("  Host:        not connected"),
        }
        surface.write_line(&format!("  Add-ons:     {}", KNOWN_ADDONS.join(", ")));
    }

    fn history(&self, surface: &dyn TerminalSurface) {
        let history = self
            .store
            .load()
            .map(|state| state.command_history)
            .unwrap_or_default();
        if history.is_empty() {
            surface.write_line("No saved command history.");
            return;
        }
        for (i, entry) in history.iter().enumerate() {
            surface.write_line(&format!("{:>4}  {}", i + 1, entry));
        }
    }
}
