//! Optimize command implementation
//!
//! Handles the `rjs-filter optimize` command which runs every given file
//! through r.js and writes the results into an output directory.

use anyhow::{bail, Context, Result};
use console::style;
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use super::{load_config, output_path, require_file};
use crate::error::RjsError;
use crate::filter::{Asset, RjsFilter, SourceAsset};
use crate::fmt::{format_bytes, reduction_percent, CHART, CHECKMARK, ROCKET, SPARKLES};
use crate::infra::{CommandExecutor, FileSystem, RealFileSystem};

/// Result of optimizing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizedFile {
    /// File as given on the command line
    pub input: PathBuf,
    /// Where the optimized content was written
    pub output: PathBuf,
    /// Size before optimization
    pub before_bytes: u64,
    /// Size after optimization
    pub after_bytes: u64,
}

/// Optimize `files` with the configured r.js and write them to `out_dir`
///
/// # Examples
///
/// ```no_run
/// use rjs_filter::cmd::cmd_optimize;
/// use std::path::{Path, PathBuf};
///
/// cmd_optimize(&[PathBuf::from("js/app/main.js")], Path::new("build"), None, false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is missing or invalid
/// - Any file doesn't exist
/// - The optimizer fails for any file
pub fn cmd_optimize(
    files: &[PathBuf],
    out_dir: &Path,
    config: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let (config_file, root) = load_config(config)?;
    let filter = RjsFilter::new(
        config_file.optimizer_command(&root),
        config_file.filter_config(&root),
    );
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let out_dir = cwd.join(out_dir);

    if !json_output {
        println!(
            "{} {} Optimizing {} file(s)",
            ROCKET,
            style("rjs-filter optimize").bold(),
            files.len()
        );
        println!();
    }

    let results = optimize_files(&filter, &cwd, files, &out_dir)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        present_summary(&results, &out_dir);
    }

    Ok(())
}

/// Run `filter` over every file in parallel and write each result to `out_dir`
///
/// Files are read relative to `source_root`, which also becomes each asset's
/// source root. Results come back in input order; the command fails if any file fails.
pub fn optimize_files<FS, CE>(
    filter: &RjsFilter<FS, CE>,
    source_root: &Path,
    files: &[PathBuf],
    out_dir: &Path,
) -> Result<Vec<OptimizedFile>>
where
    FS: FileSystem + Sync,
    CE: CommandExecutor + Sync,
{
    let outputs = files
        .iter()
        .map(|file| output_path(file, out_dir))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for output in &outputs {
        if !seen.insert(output) {
            bail!(
                "More than one input would be written to {}",
                output.display()
            );
        }
    }

    for file in files {
        require_file(source_root, file, "optimize")?;
    }

    std::fs::create_dir_all(out_dir).map_err(|e| RjsError::Io {
        context: format!("creating {}", out_dir.display()),
        source: e,
    })?;

    files
        .par_iter()
        .zip(outputs.into_par_iter())
        .map(|(file, output)| optimize_one(filter, source_root, file, output))
        .collect()
}

fn optimize_one<FS: FileSystem, CE: CommandExecutor>(
    filter: &RjsFilter<FS, CE>,
    source_root: &Path,
    file: &Path,
    output: PathBuf,
) -> Result<OptimizedFile> {
    let mut asset = SourceAsset::load(source_root, file, &RealFileSystem)
        .map_err(RjsError::from)?;
    let before_bytes = asset.content().len() as u64;

    filter
        .dump(&mut asset)
        .map_err(RjsError::from)
        .with_context(|| format!("Failed to optimize {}", file.display()))?;

    let after_bytes = asset.content().len() as u64;
    std::fs::write(&output, asset.content()).map_err(|e| RjsError::Io {
        context: format!("writing {}", output.display()),
        source: e,
    })?;
    info!(
        "Optimized {} -> {} ({} -> {} bytes)",
        file.display(),
        output.display(),
        before_bytes,
        after_bytes
    );

    Ok(OptimizedFile {
        input: file.to_path_buf(),
        output,
        before_bytes,
        after_bytes,
    })
}

fn present_summary(results: &[OptimizedFile], out_dir: &Path) {
    println!("{} {}", CHART, style("Size Summary").bold());
    for result in results {
        println!(
            "   {} {}  {} -> {} ({:.1}% smaller)",
            CHECKMARK,
            style(result.input.display()).cyan(),
            format_bytes(result.before_bytes),
            style(format_bytes(result.after_bytes)).green(),
            reduction_percent(result.before_bytes, result.after_bytes)
        );
    }

    let before: u64 = results.iter().map(|r| r.before_bytes).sum();
    let after: u64 = results.iter().map(|r| r.after_bytes).sum();
    println!();
    println!(
        "{} Optimized {} file(s) into {}: {} -> {} ({:.1}% smaller)",
        SPARKLES,
        results.len(),
        style(out_dir.display()).cyan().bold(),
        format_bytes(before),
        format_bytes(after),
        reduction_percent(before, after)
    );
}
