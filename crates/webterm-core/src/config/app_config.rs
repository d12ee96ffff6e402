use crate::error::{Result, WebTermError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub font_family: String,
    pub font_size: u16,
    /// Name of a built-in theme applied when no theme was persisted.
    pub theme: String,
    pub prompt: String,
    pub scrollback_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key the terminal state record is stored under.
    pub state_key: String,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            font_family: "Cascadia Mono, Consolas, monospace".to_string(),
            font_size: 14,
            theme: "dark".to_string(),
            prompt: "C:\\Users\\guest>".to_string(),
            scrollback_lines: 1000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_key: crate::config::terminal_state::STORAGE_KEY.to_string(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Get the project directories for WebTerm.
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "webterm", "WebTerm").ok_or_else(|| {
            WebTermError::Config("Could not determine config directory".to_string())
        })
    }

    /// Get the config directory path.
    pub fn config_dir() -> PathBuf {
        match Self::project_dirs() {
            Ok(dirs) => dirs.config_dir().to_path_buf(),
            Err(_) => {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".config").join("webterm")
            }
        }
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory the persisted terminal state lives in.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.storage.data_dir {
            return dir.clone();
        }
        match Self::project_dirs() {
            Ok(dirs) => dirs.data_dir().to_path_buf(),
            Err(_) => Self::config_dir(),
        }
    }

    /// Load config from disk, or create and save defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config = Self::parse(&content).map_err(|e| {
                WebTermError::Config(format!("Failed to parse config at {}: {}", path.display(), e))
            })?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = Self::config_dir();

        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            WebTermError::Serialization(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(&path, content)?;
        info!("Saved config to {}", path.display());

        Ok(())
    }
}
