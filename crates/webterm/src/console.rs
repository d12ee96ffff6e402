use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use parking_lot::Mutex;
use std::io::Write;
use webterm_core::config::app_config::TerminalConfig;
use webterm_core::TerminalTheme;
use webterm_terminal::surface::{Marker, SurfaceOptions};
use webterm_terminal::{ScrollbackSurface, TerminalSurface};

/// Surface that mirrors everything into a scrollback and onto a real
/// terminal.
pub struct ConsoleSurface {
    scrollback: ScrollbackSurface,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSurface {
    pub fn new(cols: u16, rows: u16, config: &TerminalConfig, out: Box<dyn Write + Send>) -> Self {
        let options = SurfaceOptions {
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            theme: TerminalTheme::find(&config.theme),
        };
        Self {
            scrollback: ScrollbackSurface::new(cols, rows, config.scrollback_lines)
                .with_options(options),
            out: Mutex::new(out),
        }
    }

    pub fn stdout(cols: u16, rows: u16, config: &TerminalConfig) -> Self {
        Self::new(cols, rows, config, Box::new(std::io::stdout()))
    }

    pub fn scrollback(&self) -> &ScrollbackSurface {
        &self.scrollback
    }

    /// Print the prompt. Not recorded in the scrollback until a line is
    /// submitted.
    pub fn show_prompt(&self, prompt: &str) {
        self.emit(prompt);
    }

    /// Record a submitted line as the terminal echoed it.
    pub fn record_input(&self, prompt: &str, line: &str) {
        self.scrollback.write_line(&format!("{}{}", prompt, line));
    }

    /// Point the real terminal's default colors at `theme` (OSC 10/11/12).
    pub fn apply_theme_colors(&self, theme: &TerminalTheme) {
        self.emit(&format!(
            "\x1b]10;{}\x07\x1b]11;{}\x07\x1b]12;{}\x07",
            theme.foreground, theme.background, theme.cursor
        ));
    }

    fn emit(&self, data: &str) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(data.as_bytes()).and_then(|_| out.flush()) {
            tracing::debug!("Console write failed: {}", e);
        }
    }
}

impl TerminalSurface for ConsoleSurface {
    fn write(&self, data: &str) {
        self.scrollback.write(data);
        self.emit(&data.replace('\n', "\r\n"));
    }

    fn clear(&self) {
        self.scrollback.clear();
        let mut out = self.out.lock();
        let result = out
            .queue(Clear(ClearType::All))
            .and_then(|o| o.queue(MoveTo(0, 0)))
            .and_then(|o| o.flush());
        if let Err(e) = result {
            tracing::debug!("Console clear failed: {}", e);
        }
    }

    fn register_marker(&self) -> Option<Marker> {
        self.scrollback.register_marker()
    }

    fn options(&self) -> SurfaceOptions {
        self.scrollback.options()
    }

    fn set_font_size_option(&self, size: u16) {
        self.scrollback.set_font_size_option(size);
    }

    fn set_theme_option(&self, theme: TerminalTheme) {
        self.apply_theme_colors(&theme);
        self.scrollback.set_theme_option(theme);
    }

    fn dimensions(&self) -> (u16, u16) {
        self.scrollback.dimensions()
    }

    fn recent_lines(&self, count: usize) -> Vec<String> {
        self.scrollback.recent_lines(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer whose bytes can be inspected after being boxed.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn console() -> (ConsoleSurface, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let surface = ConsoleSurface::new(
            80,
            24,
            &TerminalConfig::default(),
            Box::new(buffer.clone()),
        );
        (surface, buffer)
    }

    #[test]
    fn test_write_mirrors_to_output() {
        let (surface, buffer) = console();
        surface.write_line("hello");
        assert_eq!(surface.scrollback().lines(), vec!["hello"]);
        assert_eq!(buffer.text(), "hello\r\n");
    }

    #[test]
    fn test_prompt_is_not_recorded_until_submitted() {
        let (surface, buffer) = console();
        surface.show_prompt("guest>");
        assert!(surface.scrollback().lines().is_empty());
        surface.record_input("guest>", "ver");
        assert_eq!(surface.scrollback().lines(), vec!["guest>ver"]);
        assert_eq!(buffer.text(), "guest>");
    }

    #[test]
    fn test_initial_options_come_from_config() {
        let (surface, _buffer) = console();
        let options = surface.options();
        assert_eq!(options.font_size, 14);
        assert_eq!(options.theme.map(|t| t.name), Some("dark".to_string()));
    }

    #[test]
    fn test_theme_option_emits_osc_colors() {
        let (surface, buffer) = console();
        surface.set_theme_option(TerminalTheme::matrix());
        assert!(buffer.text().contains("\x1b]11;#0d0208\x07"));
    }
}
