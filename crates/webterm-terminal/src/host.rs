//! Capabilities the embedding application may lend to the dispatcher.
//!
//! Each UI-affecting operation is its own trait. A host advertises the ones
//! it supports by overriding the matching accessor on [`TerminalHost`]; every
//! accessor defaults to `None`, so a host only implements what it has.

use crate::surface::Marker;
use crate::Result;
use webterm_core::TerminalTheme;

pub trait FontSizeControl: Send + Sync {
    fn set_font_size(&self, size: u16) -> Result<()>;
}

pub trait ThemeControl: Send + Sync {
    fn set_theme(&self, theme: &TerminalTheme) -> Result<()>;
}

pub trait FitControl: Send + Sync {
    /// Resize to the container and return the new `(cols, rows)`.
    fn fit_to_container(&self) -> Result<(u16, u16)>;
}

pub trait ContentExport: Send + Sync {
    fn export_content(&self) -> Result<String>;
}

/// Where a decoration is anchored on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorationAnchor {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationOptions {
    pub anchor: DecorationAnchor,
    /// Width in cells.
    pub width: u16,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
}

impl Default for DecorationOptions {
    fn default() -> Self {
        Self {
            anchor: DecorationAnchor::Left,
            width: 1,
            background_color: None,
            foreground_color: None,
        }
    }
}

pub trait DecorationControl: Send + Sync {
    fn add_decoration(&self, marker: Marker, options: DecorationOptions) -> Result<()>;
}

pub trait ResetControl: Send + Sync {
    /// Restore renderer defaults and drop persisted state.
    fn reset_terminal(&self) -> Result<()>;
}

pub trait SearchControl: Send + Sync {
    /// Highlight the next match. Returns whether anything matched.
    fn search_for(&self, term: &str) -> Result<bool>;
}

pub trait RendererInfo: Send + Sync {
    /// Whether a GPU-accelerated renderer is currently active.
    fn is_accelerated(&self) -> bool;
}

/// The host capability handle.
pub trait TerminalHost: Send + Sync {
    fn font_size(&self) -> Option<&dyn FontSizeControl> {
        None
    }

    fn theme(&self) -> Option<&dyn ThemeControl> {
        None
    }

    fn fit(&self) -> Option<&dyn FitControl> {
        None
    }

    fn export(&self) -> Option<&dyn ContentExport> {
        None
    }

    fn decorations(&self) -> Option<&dyn DecorationControl> {
        None
    }

    fn reset(&self) -> Option<&dyn ResetControl> {
        None
    }

    fn search(&self) -> Option<&dyn SearchControl> {
        None
    }

    fn renderer(&self) -> Option<&dyn RendererInfo> {
        None
    }

    /// Names of the capabilities this host provides, for diagnostics.
    fn capability_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.font_size().is_some() {
            names.push("setFontSize");
        }
        if self.theme().is_some() {
            names.push("setTheme");
        }
        if self.fit().is_some() {
            names.push("fit");
        }
        if self.export().is_some() {
            names.push("exportTerminalContent");
        }
        if self.decorations().is_some() {
            names.push("addDecoration");
        }
        if self.reset().is_some() {
            names.push("resetTerminal");
        }
        if self.search().is_some() {
            names.push("searchFor");
        }
        if self.renderer().is_some() {
            names.push("renderer");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareHost;
    impl TerminalHost for BareHost {}

    struct FitOnly;
    impl FitControl for FitOnly {
        fn fit_to_container(&self) -> Result<(u16, u16)> {
            Ok((100, 30))
        }
    }
    impl TerminalHost for FitOnly {
        fn fit(&self) -> Option<&dyn FitControl> {
            Some(self)
        }
    }

    #[test]
    fn test_capabilities_default_to_absent() {
        let host = BareHost;
        assert!(host.font_size().is_none());
        assert!(host.export().is_none());
        assert!(host.capability_names().is_empty());
    }

    #[test]
    fn test_capability_names() {
        let host = FitOnly;
        assert_eq!(host.capability_names(), vec!["fit"]);
        assert_eq!(host.fit().unwrap().fit_to_container().unwrap(), (100, 30));
    }
}
