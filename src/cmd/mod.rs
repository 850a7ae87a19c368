//! Command handlers for rjs-filter CLI
//!
//! This module contains all command implementations, organized by functionality.
//! Each submodule handles a specific CLI command.

pub mod check;
pub mod completions;
pub mod init;
pub mod optimize;
pub mod profile;

// Re-export command functions for convenient access
pub use check::cmd_check;
pub use completions::cmd_completions;
pub use init::cmd_init;
pub use optimize::{cmd_optimize, optimize_files, OptimizedFile};
pub use profile::{cmd_profile, render_profile};

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigFile, ConfigLoader};
use crate::error::RjsError;

/// Load the configuration and the directory its relative paths are anchored at.
///
/// With no explicit path, `.rjs-filter.toml` in the current directory is used.
pub(crate) fn load_config(config: Option<&Path>) -> Result<(ConfigFile, PathBuf)> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    match config {
        Some(path) => {
            let path = cwd.join(path);
            let loaded = ConfigLoader::load_file(&path)?;
            let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
            Ok((loaded, root))
        }
        None => Ok((ConfigLoader::load(&cwd)?, cwd)),
    }
}

/// Fail with `FileNotFound` unless `source_root/file` is a regular file
pub(crate) fn require_file(source_root: &Path, file: &Path, operation: &str) -> Result<()> {
    let path = source_root.join(file);
    if !path.is_file() {
        return Err(RjsError::FileNotFound {
            path: file.to_path_buf(),
            operation: operation.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Where the optimized copy of `file` lands: `out_dir/<file name>`
pub(crate) fn output_path(file: &Path, out_dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("{} has no file name", file.display()))?;
    Ok(out_dir.join(name))
}
