//! Application configuration for tabby.
//!
//! User config lives at `~/.tabby/tabby.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabbyError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tabby.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tabby";

// ---------------------------------------------------------------------------
// Config structs (matching tabby.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabbyConfig {
    /// Loader defaults.
    #[serde(default)]
    pub load: LoadSection,
}

/// `[load]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    /// Class-root directories, searched in order for `<name>@<class>` files.
    #[serde(default)]
    pub class_paths: Vec<PathBuf>,

    /// Attach JSON-LD `@context` to loaded records.
    #[serde(default = "default_true")]
    pub jsonld: bool,

    /// Follow `@tabby-single-` / `@tabby-many-` imports.
    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl Default for LoadSection {
    fn default() -> Self {
        Self {
            class_paths: Vec::new(),
            jsonld: true,
            recursive: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Load config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime load configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Class search path, first existing match wins.
    pub class_paths: Vec<PathBuf>,
    /// Whether to attach `@context`.
    pub jsonld: bool,
    /// Whether to resolve sheet imports.
    pub recursive: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::from(&TabbyConfig::default())
    }
}

impl From<&TabbyConfig> for LoadConfig {
    fn from(config: &TabbyConfig) -> Self {
        Self {
            class_paths: config.load.class_paths.clone(),
            jsonld: config.load.jsonld,
            recursive: config.load.recursive,
        }
    }
}

impl LoadConfig {
    /// Put extra class roots in front of the configured ones.
    pub fn with_leading_class_paths(mut self, extra: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut paths: Vec<PathBuf> = extra.into_iter().collect();
        paths.append(&mut self.class_paths);
        self.class_paths = paths;
        self
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tabby/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| TabbyError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tabby/tabby.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<TabbyConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(TabbyConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<TabbyConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TabbyError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TabbyError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TabbyError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = render_config(&TabbyConfig::default())?;

    std::fs::write(&path, content).map_err(|e| TabbyError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Render a config as pretty TOML.
pub fn render_config(config: &TabbyConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| TabbyError::config(e.to_string()))
}
