use crate::console::ConsoleSurface;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;
use webterm_core::config::app_config::TerminalConfig;
use webterm_core::{StateStore, TerminalTheme};
use webterm_terminal::host::{
    ContentExport, DecorationControl, DecorationOptions, FitControl, FontSizeControl,
    ResetControl, SearchControl, ThemeControl,
};
use webterm_terminal::surface::Marker;
use webterm_terminal::{Result, TerminalHost, TerminalSurface};

/// Host capabilities backed by the local console.
///
/// There is no GPU renderer behind a console, so no [`RendererInfo`] is
/// offered.
///
/// [`RendererInfo`]: webterm_terminal::host::RendererInfo
pub struct LocalHost {
    surface: Arc<ConsoleSurface>,
    store: StateStore,
    defaults: TerminalConfig,
    decorations: Mutex<Vec<(Marker, DecorationOptions)>>,
}

impl LocalHost {
    pub fn new(surface: Arc<ConsoleSurface>, store: StateStore, defaults: TerminalConfig) -> Self {
        Self {
            surface,
            store,
            defaults,
            decorations: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn registered_decorations(&self) -> Vec<(Marker, DecorationOptions)> {
        self.decorations.lock().clone()
    }
}

impl FontSizeControl for LocalHost {
    fn set_font_size(&self, size: u16) -> Result<()> {
        self.surface.set_font_size_option(size);
        Ok(())
    }
}

impl ThemeControl for LocalHost {
    fn set_theme(&self, theme: &TerminalTheme) -> Result<()> {
        self.surface.set_theme_option(theme.clone());
        Ok(())
    }
}

impl FitControl for LocalHost {
    fn fit_to_container(&self) -> Result<(u16, u16)> {
        let (cols, rows) = crossterm::terminal::size()?;
        self.surface.scrollback().resize(cols, rows);
        Ok((cols, rows))
    }
}

impl ContentExport for LocalHost {
    fn export_content(&self) -> Result<String> {
        Ok(self.surface.scrollback().contents())
    }
}

impl DecorationControl for LocalHost {
    fn add_decoration(&self, marker: Marker, options: DecorationOptions) -> Result<()> {
        info!("Decoration registered at line {}", marker.line);
        self.decorations.lock().push((marker, options));
        Ok(())
    }
}

impl ResetControl for LocalHost {
    fn reset_terminal(&self) -> Result<()> {
        self.store.clear();
        self.decorations.lock().clear();
        self.surface.set_font_size_option(self.defaults.font_size);
        self.surface
            .set_theme_option(TerminalTheme::find(&self.defaults.theme).unwrap_or_default());
        self.surface.clear();
        Ok(())
    }
}

impl SearchControl for LocalHost {
    fn search_for(&self, term: &str) -> Result<bool> {
        let needle = term.to_lowercase();
        Ok(self
            .surface
            .scrollback()
            .lines()
            .iter()
            .any(|line| line.to_lowercase().contains(&needle)))
    }
}

impl TerminalHost for LocalHost {
    fn font_size(&self) -> Option<&dyn FontSizeControl> {
        Some(self)
    }

    fn theme(&self) -> Option<&dyn ThemeControl> {
        Some(self)
    }

    fn fit(&self) -> Option<&dyn FitControl> {
        Some(self)
    }

    fn export(&self) -> Option<&dyn ContentExport> {
        Some(self)
    }

    fn decorations(&self) -> Option<&dyn DecorationControl> {
        Some(self)
    }

    fn reset(&self) -> Option<&dyn ResetControl> {
        Some(self)
    }

    fn search(&self) -> Option<&dyn SearchControl> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::tests::console;
    use webterm_core::TerminalState;

    fn host() -> (LocalHost, Arc<ConsoleSurface>, StateStore) {
        let (surface, _buffer) = console();
        let surface = Arc::new(surface);
        let store = StateStore::in_memory();
        let host = LocalHost::new(surface.clone(), store.clone(), TerminalConfig::default());
        (host, surface, store)
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (host, surface, _store) = host();
        surface.write_line("Welcome to WebTerm");
        assert!(host.search_for("webterm").unwrap());
        assert!(!host.search_for("missing").unwrap());
    }

    #[test]
    fn test_export_returns_scrollback() {
        let (host, surface, _store) = host();
        surface.write_line("one");
        surface.write_line("two");
        assert_eq!(host.export_content().unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_reset_restores_defaults_and_clears_store() {
        let (host, surface, store) = host();
        store.save(&TerminalState::default());
        host.set_font_size(30).unwrap();
        host.set_theme(&TerminalTheme::matrix()).unwrap();

        host.reset_terminal().unwrap();

        assert!(store.load().is_none());
        assert_eq!(surface.options().font_size, 14);
        assert_eq!(surface.options().theme, Some(TerminalTheme::dark()));
    }

    #[test]
    fn test_decorations_are_recorded() {
        let (host, surface, _store) = host();
        let marker = surface.register_marker().unwrap();
        host.add_decoration(marker, DecorationOptions::default())
            .unwrap();
        assert_eq!(host.registered_decorations().len(), 1);
    }

    #[test]
    fn test_host_advertises_capabilities() {
        let (host, _surface, _store) = host();
        let names = host.capability_names();
        assert!(names.contains(&"setFontSize"));
        assert!(names.contains(&"searchFor"));
        assert!(!names.contains(&"renderer"));
    }
}
