//! Init command implementation
//!
//! Handles the `rjs-filter init` command which writes a starter
//! `.rjs-filter.toml` into the current directory.

use anyhow::{Context, Result};
use console::style;
use std::env;
use std::path::Path;

use crate::config::{ConfigFile, ConfigLoader, CONFIG_FILE_NAME};
use crate::fmt::{CHECKMARK, INFO, ROCKET, WARNING};

/// Create a starter configuration file in the current directory
///
/// # Examples
///
/// ```no_run
/// use rjs_filter::cmd::init::cmd_init;
///
/// cmd_init(false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_init(force: bool) -> Result<()> {
    println!(
        "{} {} Initializing rjs-filter",
        ROCKET,
        style("rjs-filter init").bold()
    );
    println!();

    let project_root = env::current_dir().context("Failed to determine current directory")?;

    if !init_project(&project_root, force)? {
        println!(
            "{} Config file already exists: {}",
            WARNING,
            style(CONFIG_FILE_NAME).cyan()
        );
        println!("   Re-run with --force to overwrite it.");
        return Ok(());
    }

    println!(
        "{} Created {}",
        CHECKMARK,
        style(CONFIG_FILE_NAME).cyan().bold()
    );
    println!();
    println!("{}  Next Steps:", INFO);
    println!(
        "   1. Point 'base-url' and 'optimizer' in {} at your project",
        CONFIG_FILE_NAME
    );
    println!(
        "   2. Run {} to verify node and r.js are found",
        style("rjs-filter check").cyan()
    );
    println!(
        "   3. Run {} to optimize",
        style("rjs-filter optimize <FILES>").cyan()
    );

    Ok(())
}

/// Write the starter config into `project_root`.
///
/// Returns `false` without touching anything when a config already exists and `force` is off.
pub fn init_project(project_root: &Path, force: bool) -> Result<bool> {
    if ConfigLoader::exists(project_root) && !force {
        return Ok(false);
    }
    ConfigLoader::save(&ConfigFile::starter(), project_root)?;
    Ok(true)
}
