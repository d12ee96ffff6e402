use serde::{Deserialize, Serialize};

/// Terminal color theme with all color slots.
///
/// Field names serialize in camelCase so a persisted theme round-trips
/// through the stored terminal state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalTheme {
    pub name: String,
    /// Default foreground
    pub foreground: String,
    /// Default background
    pub background: String,
    /// Cursor color
    pub cursor: String,
    /// Foreground of a block cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_accent: Option<String>,
    /// Selection background
    pub selection_background: String,
    pub black: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
    #[serde(flatten)]
    pub bright: Option<BrightColors>,
}

/// Bright variants of the eight base ANSI colors. Flattened into the
/// theme record, matching the xterm theme shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrightColors {
    pub bright_black: String,
    pub bright_red: String,
    pub bright_green: String,
    pub bright_yellow: String,
    pub bright_blue: String,
    pub bright_magenta: String,
    pub bright_cyan: String,
    pub bright_white: String,
}

impl Default for TerminalTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl TerminalTheme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            foreground: "#cccccc".to_string(),
            background: "#1e1e1e".to_string(),
            cursor: "#e5e5e5".to_string(),
            cursor_accent: Some("#1e1e1e".to_string()),
            selection_background: "#264f78".to_string(),
            black: "#000000".to_string(),
            red: "#cd3131".to_string(),
            green: "#0dbc79".to_string(),
            yellow: "#e5e510".to_string(),
            blue: "#2472c8".to_string(),
            magenta: "#bc3fbc".to_string(),
            cyan: "#11a8cd".to_string(),
            white: "#e5e5e5".to_string(),
            bright: Some(BrightColors {
                bright_black: "#666666".to_string(),
                bright_red: "#f14c4c".to_string(),
                bright_green: "#23d18b".to_string(),
                bright_yellow: "#f5f543".to_string(),
                bright_blue: "#3b8eea".to_string(),
                bright_magenta: "#d670d6".to_string(),
                bright_cyan: "#29b8db".to_string(),
                bright_white: "#ffffff".to_string(),
            }),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            foreground: "#2e2e2e".to_string(),
            background: "#f5f5f5".to_string(),
            cursor: "#2e2e2e".to_string(),
            cursor_accent: Some("#f5f5f5".to_string()),
            selection_background: "#b4d5fe".to_string(),
            black: "#000000".to_string(),
            red: "#c91b00".to_string(),
            green: "#00c200".to_string(),
            yellow: "#c7c400".to_string(),
            blue: "#0225c7".to_string(),
            magenta: "#ca30c7".to_string(),
            cyan: "#00c5c7".to_string(),
            white: "#c7c7c7".to_string(),
            bright: Some(BrightColors {
                bright_black: "#686868".to_string(),
                bright_red: "#ff6e67".to_string(),
                bright_green: "#5ffa68".to_string(),
                bright_yellow: "#fffc67".to_string(),
                bright_blue: "#6871ff".to_string(),
                bright_magenta: "#ff77ff".to_string(),
                bright_cyan: "#60fdff".to_string(),
                bright_white: "#ffffff".to_string(),
            }),
        }
    }

    /// Green-on-black phosphor theme. Has no bright variants.
    pub fn matrix() -> Self {
        Self {
            name: "matrix".to_string(),
            foreground: "#00ff41".to_string(),
            background: "#0d0208".to_string(),
            cursor: "#00ff41".to_string(),
            cursor_accent: None,
            selection_background: "#003b00".to_string(),
            black: "#0d0208".to_string(),
            red: "#008f11".to_string(),
            green: "#00ff41".to_string(),
            yellow: "#39ff14".to_string(),
            blue: "#00b32c".to_string(),
            magenta: "#007a1f".to_string(),
            cyan: "#20c20e".to_string(),
            white: "#b7ffb7".to_string(),
            bright: None,
        }
    }

    /// All built-in themes
    pub fn builtins() -> Vec<Self> {
        vec![Self::dark(), Self::light(), Self::matrix()]
    }

    /// Names of the built-in themes, in table order.
    pub fn builtin_names() -> Vec<String> {
        Self::builtins().into_iter().map(|t| t.name).collect()
    }

    /// Look up a built-in theme by name, ignoring case.
    pub fn find(name: &str) -> Option<Self> {
        Self::builtins()
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
    }

    /// The eight base ANSI colors followed by any bright variants, as
    /// `(slot name, color)` pairs.
    pub fn palette(&self) -> Vec<(&'static str, &str)> {
        let mut colors = vec![
            ("black", self.black.as_str()),
            ("red", self.red.as_str()),
            ("green", self.green.as_str()),
            ("yellow", self.yellow.as_str()),
            ("blue", self.blue.as_str()),
            ("magenta", self.magenta.as_str()),
            ("cyan", self.cyan.as_str()),
            ("white", self.white.as_str()),
        ];
        if let Some(ref b) = self.bright {
            colors.extend([
                ("brightBlack", b.bright_black.as_str()),
                ("brightRed", b.bright_red.as_str()),
                ("brightGreen", b.bright_green.as_str()),
                ("brightYellow", b.bright_yellow.as_str()),
                ("brightBlue", b.bright_blue.as_str()),
                ("brightMagenta", b.bright_magenta.as_str()),
                ("brightCyan", b.bright_cyan.as_str()),
                ("brightWhite", b.bright_white.as_str()),
            ]);
        }
        colors
    }
}
