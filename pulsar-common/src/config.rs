//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PULSAR_ROOT_FOLDER";

/// File name of the diagnosis database inside the root folder
pub const DATABASE_FILE_NAME: &str = "medical_diagnosis.db";

/// Contents of the optional `config.toml`
///
/// Every field is optional: a missing or partial file is never fatal.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
}

impl TomlConfig {
    /// Parse TOML text into a config
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config.toml: {}", e)))
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Root folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `PULSAR_ROOT_FOLDER` environment variable
/// 3. `root_folder` in the TOML config file
/// 4. OS-dependent compiled default (fallback)
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_file: None,
        }
    }

    /// Set the command-line override
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an explicit config file instead of the platform location
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Resolve the root folder. Never fails; falls back to the compiled default.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        let config_path = self.config_file.clone().or_else(|| default_config_file().ok());
        if let Some(config_path) = config_path {
            match TomlConfig::load(&config_path) {
                Ok(TomlConfig { root_folder: Some(root) }) => {
                    info!(
                        "[{}] Root folder from {}: {}",
                        self.module_name,
                        config_path.display(),
                        root.display()
                    );
                    return root;
                }
                Ok(_) => debug!("{} has no root_folder key", config_path.display()),
                Err(e) => warn!("Ignoring config file {}: {}", config_path.display(), e),
            }
        }

        let fallback = default_root_folder();
        info!("[{}] Root folder from compiled default: {}", self.module_name, fallback.display());
        fallback
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if it doesn't exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the diagnosis database file
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// Get default configuration file path for the platform
fn default_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pulsar").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/pulsar/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("pulsar"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\pulsar"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("pulsar"))
            .unwrap_or_else(|| PathBuf::from("./pulsar_data"))
    }
}
