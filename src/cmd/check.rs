//! Check command implementation
//!
//! Handles the `rjs-filter check` command which loads the configuration and
//! verifies that the interpreter and the optimizer script can be found.

use anyhow::Result;
use console::style;
use std::path::Path;

use super::load_config;
use crate::error::RjsError;
use crate::fmt::{INFO, SPARKLES};
use crate::tools::{OptimizerTools, ToolError};

/// Report whether the configured interpreter and optimizer resolve
///
/// # Errors
///
/// Returns [`RjsError::ToolMissing`] (exit code 127) for the first tool that
/// cannot be found, or a configuration error if the config does not load.
pub fn cmd_check(config: Option<&Path>) -> Result<()> {
    let (config_file, root) = load_config(config)?;
    let command = config_file.optimizer_command(&root);
    let filter_config = config_file.filter_config(&root);

    println!("{}  Configuration:", INFO);
    println!(
        "   {} base-url = {}",
        style("•").dim(),
        style(filter_config.base_url()).green()
    );
    println!(
        "   {} {} path alias(es), {} external(s), {} shim(s), {} option(s)",
        style("•").dim(),
        filter_config.paths().len(),
        filter_config.external().len(),
        filter_config.shim().len(),
        filter_config.options().len()
    );
    if filter_config.has_modules() {
        println!(
            "   {} multi-output mode: {} module(s)",
            style("•").dim(),
            filter_config.modules().len()
        );
    }

    OptimizerTools::new(&command)
        .check_all()
        .map_err(|e| match e {
            ToolError::MissingTool { tool, program } => {
                anyhow::Error::from(RjsError::ToolMissing { tool, program })
            }
            other => anyhow::Error::from(other),
        })?;

    println!();
    println!("{} Ready to optimize", SPARKLES);
    Ok(())
}
