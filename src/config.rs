// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::DEFAULT_TOOL_NAME;
use crate::host::{PREF_BCFILE_IN_DIR, PREF_CUSTOM_DIR};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,

    /// Host preference defaults, used when a scene doesn't set them
    #[serde(default = "default_preferences")]
    pub preferences: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Installation root holding `bin/<executable>`; scenes may override it
    #[serde(default)]
    pub install_path: Option<PathBuf>,

    /// Name of the compression tool inside the install's bin directory
    #[serde(default = "default_executable")]
    pub executable: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing level when no -v flag is given
    #[serde(default = "default_level")]
    pub level: String,

    /// Append tool command lines and outcomes to bcexport.log
    #[serde(default)]
    pub debug_log: bool,
}

fn default_executable() -> String {
    DEFAULT_TOOL_NAME.to_string()
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_preferences() -> BTreeMap<String, String> {
    BTreeMap::from([
        (PREF_BCFILE_IN_DIR.to_string(), "0".to_string()),
        (PREF_CUSTOM_DIR.to_string(), String::new()),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            preferences: default_preferences(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            install_path: None,
            executable: default_executable(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            debug_log: false,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("bcexport")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("bcexport")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // Try to save the default config, but don't fail if we can't
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!(error = %e, "could not create default config file");
                eprintln!("Warning: Could not create default config file: {}", e);
                eprintln!(
                    "Using built-in defaults. Run 'bcexport init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            Config::default().save()?;
        }
        Ok(())
    }

    /// Where the debug log goes, if enabled
    pub fn debug_log_path(&self) -> Option<PathBuf> {
        if self.logging.debug_log {
            crate::engine::default_debug_log_path().ok()
        } else {
            None
        }
    }
}
