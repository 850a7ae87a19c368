//! Test fixture helpers for creating test projects
//!
//! Provides utilities for setting up a small RequireJS project: sources under
//! `js/`, a scratch `tmp/` directory and an optional `.rjs-filter.toml`.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Re-export anyhow for convenience
pub use anyhow;

/// Entry point of the fixture application
pub const MAIN_JS: &str = "require(['app/util'], function (util) { util.start(); });\n";

/// Second entry point, used by multi-file and multi-module tests
pub const ADMIN_JS: &str = "require(['jquery'], function ($) { $('#admin').show(); });\n";

/// Helper module required by the entry points
pub const UTIL_JS: &str = "define({ start: function () {} });\n";

/// Creates a project with `js/app/{main,admin,util}.js` and an empty `tmp/`
///
/// # Returns
///
/// The TempDir holding the project - it must be kept alive
pub fn create_project() -> anyhow::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let app = temp_dir.path().join("js/app");
    fs::create_dir_all(&app)?;
    fs::write(app.join("main.js"), MAIN_JS)?;
    fs::write(app.join("admin.js"), ADMIN_JS)?;
    fs::write(app.join("util.js"), UTIL_JS)?;
    fs::create_dir(temp_dir.path().join("tmp"))?;
    Ok(temp_dir)
}

/// Writes `.rjs-filter.toml` running `script` through `sh`, followed by `extra`
pub fn write_config(project: &Path, script: &str, extra: &str) -> anyhow::Result<()> {
    fs::write(
        project.join(".rjs-filter.toml"),
        format!(
            r#"base-url = "js"
interpreter = "sh"
optimizer = "{}"
external = ["jquery"]

[paths]
app = "app"
{}"#,
            script, extra
        ),
    )?;
    Ok(())
}
