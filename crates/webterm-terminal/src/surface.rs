//! The output surface commands write to.
//!
//! [`TerminalSurface`] stands in for the rendering widget: it can print
//! text, clear itself, drop a marker at the cursor line and expose the
//! options a renderer would be configured with. [`ScrollbackSurface`] is an
//! in-memory implementation with a bounded scrollback.

use parking_lot::Mutex;
use std::collections::VecDeque;
use webterm_core::TerminalTheme;

/// A line anchor registered at the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub id: u64,
    /// Absolute buffer line, counting lines scrolled out of the scrollback.
    pub line: usize,
}

/// Renderer options visible to commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub font_family: String,
    pub font_size: u16,
    pub theme: Option<TerminalTheme>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 14,
            theme: None,
        }
    }
}

pub trait TerminalSurface: Send + Sync {
    /// Write text without a trailing line break.
    fn write(&self, data: &str);

    fn write_line(&self, line: &str) {
        self.write(line);
        self.write("\n");
    }

    fn clear(&self);

    /// Register a marker at the cursor line. `None` if markers cannot be
    /// created on this surface.
    fn register_marker(&self) -> Option<Marker>;

    fn options(&self) -> SurfaceOptions;

    fn set_font_size_option(&self, size: u16);

    /// Assign the theme option directly on the renderer.
    fn set_theme_option(&self, theme: TerminalTheme);

    /// Viewport size as `(cols, rows)`.
    fn dimensions(&self) -> (u16, u16);

    /// The last `count` completed lines, oldest first.
    fn recent_lines(&self, _count: usize) -> Vec<String> {
        Vec::new()
    }
}

struct ScrollbackInner {
    lines: VecDeque<String>,
    pending: String,
    /// Lines evicted from the front of `lines`.
    evicted: usize,
    capacity: usize,
    next_marker_id: u64,
    markers_supported: bool,
    options: SurfaceOptions,
    cols: u16,
    rows: u16,
}

impl ScrollbackInner {
    fn push_line(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line);
    }

    fn cursor_line(&self) -> usize {
        self.evicted + self.lines.len()
    }
}

/// In-memory surface keeping at most `capacity` completed lines.
pub struct ScrollbackSurface {
    inner: Mutex<ScrollbackInner>,
}

impl ScrollbackSurface {
    pub fn new(cols: u16, rows: u16, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ScrollbackInner {
                lines: VecDeque::new(),
                pending: String::new(),
                evicted: 0,
                capacity: capacity.max(1),
                next_marker_id: 1,
                markers_supported: true,
                options: SurfaceOptions::default(),
                cols,
                rows,
            }),
        }
    }

    pub fn with_options(self, options: SurfaceOptions) -> Self {
        self.inner.lock().options = options;
        self
    }

    /// Toggle marker support; [`TerminalSurface::register_marker`] returns
    /// `None` while disabled.
    pub fn set_markers_supported(&self, supported: bool) {
        self.inner.lock().markers_supported = supported;
    }

    pub fn resize(&self, cols: u16, rows: u16) {
        let mut inner = self.inner.lock();
        inner.cols = cols;
        inner.rows = rows;
    }

    /// Completed lines currently in the scrollback, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.iter().cloned().collect()
    }

    /// Whole buffer as text, including any unterminated line.
    pub fn contents(&self) -> String {
        let inner = self.inner.lock();
        let mut out = String::new();
        for line in &inner.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&inner.pending);
        out
    }
}

impl TerminalSurface for ScrollbackSurface {
    fn write(&self, data: &str) {
        let mut inner = self.inner.lock();
        let mut parts = data.split('\n').peekable();
        while let Some(part) = parts.next() {
            inner.pending.push_str(part.trim_end_matches('\r'));
            if parts.peek().is_some() {
                let line = std::mem::take(&mut inner.pending);
                inner.push_line(line);
            }
        }
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.lines.len();
        inner.lines.clear();
        inner.evicted += dropped;
        inner.pending.clear();
    }

    fn register_marker(&self) -> Option<Marker> {
        let mut inner = self.inner.lock();
        if !inner.markers_supported {
            return None;
        }
        let marker = Marker {
            id: inner.next_marker_id,
            line: inner.cursor_line(),
        };
        inner.next_marker_id += 1;
        Some(marker)
    }

    fn options(&self) -> SurfaceOptions {
        self.inner.lock().options.clone()
    }

    fn set_font_size_option(&self, size: u16) {
        self.inner.lock().options.font_size = size;
    }

    fn set_theme_option(&self, theme: TerminalTheme) {
        self.inner.lock().options.theme = Some(theme);
    }

    fn dimensions(&self) -> (u16, u16) {
        let inner = self.inner.lock();
        (inner.cols, inner.rows)
    }

    fn recent_lines(&self, count: usize) -> Vec<String> {
        let inner = self.inner.lock();
        let skip = inner.lines.len().saturating_sub(count);
        inner.lines.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_splits_lines() {
        let surface = ScrollbackSurface::new(80, 24, 100);
        surface.write("a\r\nb\n");
        surface.write("partial");
        surface.write_line(" done");
        assert_eq!(surface.lines(), vec!["a", "b", "partial done"]);
        assert_eq!(surface.contents(), "a\nb\npartial done\n");
    }

    #[test]
    fn test_scrollback_is_bounded() {
        let surface = ScrollbackSurface::new(80, 24, 3);
        for i in 0..5 {
            surface.write_line(&i.to_string());
        }
        assert_eq!(surface.lines(), vec!["2", "3", "4"]);
        assert_eq!(surface.recent_lines(2), vec!["3", "4"]);
        assert_eq!(surface.register_marker().unwrap().line, 5);
    }

    #[test]
    fn test_clear_keeps_line_numbering() {
        let surface = ScrollbackSurface::new(80, 24, 10);
        surface.write_line("one");
        surface.write_line("two");
        surface.clear();
        assert!(surface.lines().is_empty());
        assert_eq!(surface.register_marker().unwrap().line, 2);
    }

    #[test]
    fn test_markers_can_be_disabled() {
        let surface = ScrollbackSurface::new(80, 24, 10);
        let first = surface.register_marker().unwrap();
        surface.set_markers_supported(false);
        assert!(surface.register_marker().is_none());
        surface.set_markers_supported(true);
        assert_eq!(surface.register_marker().unwrap().id, first.id + 1);
    }

    #[test]
    fn test_options_and_resize() {
        let surface = ScrollbackSurface::new(80, 24, 10);
        surface.set_font_size_option(20);
        surface.set_theme_option(TerminalTheme::light());
        surface.resize(120, 40);
        let options = surface.options();
        assert_eq!(options.font_size, 20);
        assert_eq!(options.theme.unwrap().name, "light");
        assert_eq!(surface.dimensions(), (120, 40));
    }
}
