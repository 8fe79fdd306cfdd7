//! Configuration loading and root folder resolution
//!
//! Root folder priority order (highest first):
//! 1. Command-line argument
//! 2. `PALETTE_ROOT_FOLDER`, then `PALETTE_ROOT` environment variables
//! 3. `root_folder` key of the module TOML file
//! 4. OS-dependent compiled default
//!
//! A missing or unreadable TOML file never aborts startup: the resolver
//! logs a warning and falls through to the next tier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "PALETTE_ROOT_FOLDER";
/// Alternative root folder environment variable
pub const ROOT_ENV: &str = "PALETTE_ROOT";
/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "palette.db";

/// Bootstrap configuration read from `<config_dir>/palette/<module>.toml`
///
/// Module specific tables (e.g. `[crawl]`) are ignored here and parsed by
/// the module that owns them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the database and downloaded images
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Flickr API key
    #[serde(default)]
    pub flickr_api_key: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled per-platform defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/palette
        dirs::data_local_dir()
            .map(|d| d.join("palette"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/palette"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("palette"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/palette"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("palette"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\palette"))
    } else {
        PathBuf::from("./palette_data")
    }
}

/// Resolves the root folder for one module
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            config_file: None,
        }
    }

    /// Set the command-line override (highest priority)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an explicit TOML file instead of the per-module default
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Path of the module TOML file, if the platform has a config directory
    pub fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_file {
            return Some(path.clone());
        }
        dirs::config_dir().map(|d| d.join("palette").join(format!("{}.toml", self.module_name)))
    }

    /// Load the module TOML file, returning `None` when it is absent or invalid
    pub fn load_toml(&self) -> Option<TomlConfig> {
        let path = self.config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No TOML config file");
            return None;
        }

        match load_toml_config(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable TOML config");
                None
            }
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Ok(path) = std::env::var(ROOT_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(root_folder) = self.load_toml().and_then(|config| config.root_folder) {
            return root_folder;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and derives paths inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder).map_err(|e| {
            Error::Config(format!(
                "Cannot create root folder {}: {}",
                self.root_folder.display(),
                e
            ))
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}
