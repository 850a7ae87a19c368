//! Configuration file loading and saving

use super::file::{ConfigFile, CONFIG_FILE_NAME};
use crate::error::RjsError;
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::{Context, Result};
use std::path::Path;

/// Handles loading and saving configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from .rjs-filter.toml in the given directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rjs_filter::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("Optimizer: {}", config.optimizer);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<ConfigFile> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load config with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(project_root: &Path, fs: &FS) -> Result<ConfigFile> {
        Self::load_file_with_fs(&project_root.join(CONFIG_FILE_NAME), fs)
    }

    /// Load config from an explicit file path
    pub fn load_file(config_path: &Path) -> Result<ConfigFile> {
        Self::load_file_with_fs(config_path, &RealFileSystem)
    }

    /// Load config from an explicit file path with a custom filesystem implementation
    pub fn load_file_with_fs<FS: FileSystem>(config_path: &Path, fs: &FS) -> Result<ConfigFile> {
        let contents = match fs.read_to_string(config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RjsError::ConfigNotFound {
                    path: config_path.to_path_buf(),
                    source: e,
                }
                .into());
            }
            Err(e) => {
                return Err(RjsError::Io {
                    context: format!("reading {}", config_path.display()),
                    source: e,
                }
                .into());
            }
        };

        let config: ConfigFile =
            toml_edit::de::from_str(&contents).map_err(|e| RjsError::InvalidConfig {
                path: config_path.to_path_buf(),
                reason: e.to_string().trim_end().to_string(),
            })?;

        config.validate().map_err(|e| RjsError::InvalidConfig {
            path: config_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to .rjs-filter.toml in the given directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rjs_filter::config::{ConfigFile, ConfigLoader};
    /// use std::path::Path;
    ///
    /// let config = ConfigFile::starter();
    /// ConfigLoader::save(&config, Path::new("."))?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn save(config: &ConfigFile, project_root: &Path) -> Result<()> {
        Self::save_with_fs(config, project_root, &RealFileSystem)
    }

    /// Save config with a custom filesystem implementation
    pub fn save_with_fs<FS: FileSystem>(
        config: &ConfigFile,
        project_root: &Path,
        fs: &FS,
    ) -> Result<()> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        let contents =
            toml_edit::ser::to_string_pretty(config).context("Failed to serialize config")?;

        fs.write(&config_path, contents)
            .context("Failed to write .rjs-filter.toml")?;

        Ok(())
    }

    /// Check if config file exists in project
    pub fn exists(project_root: &Path) -> bool {
        project_root.join(CONFIG_FILE_NAME).exists()
    }
}
