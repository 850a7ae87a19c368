//! Profile command implementation
//!
//! Handles the `rjs-filter profile` command, a dry run that prints the build
//! profile `optimize` would hand to r.js for one file.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use super::{load_config, output_path, require_file};
use crate::error::RjsError;
use crate::filter::{FilterConfig, ProfileBuilder, SourceAsset};
use crate::infra::RealFileSystem;

/// Print the build profile for `file`
///
/// # Examples
///
/// ```no_run
/// use rjs_filter::cmd::cmd_profile;
/// use std::path::Path;
///
/// cmd_profile(Path::new("js/app/main.js"), Path::new("build"), None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_profile(file: &Path, out_dir: &Path, config: Option<&Path>) -> Result<()> {
    let (config_file, root) = load_config(config)?;
    let cwd = env::current_dir().context("Failed to determine current directory")?;

    let text = render_profile(
        &config_file.filter_config(&root),
        &cwd,
        file,
        &cwd.join(out_dir),
    )?;
    println!("{}", text);

    Ok(())
}

/// Build the profile text for `source_root/file`
///
/// The file itself stands in for the temp input and `out_dir/<file name>` for the output.
pub fn render_profile(
    config: &FilterConfig,
    source_root: &Path,
    file: &Path,
    out_dir: &Path,
) -> Result<String> {
    require_file(source_root, file, "profile")?;
    let asset =
        SourceAsset::load(source_root, file, &RealFileSystem).map_err(RjsError::from)?;

    let input = source_root.join(file);
    let output = output_path(file, out_dir)?;
    let profile = ProfileBuilder::new(config)
        .build(&input, &output, &asset)
        .map_err(RjsError::from)?;

    Ok(profile
        .to_profile_text()
        .context("Failed to serialize build profile")?)
}
