//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Project fixtures (JavaScript sources and `.rjs-filter.toml`)
//! - Stand-in optimizers, both in-process and as `sh` scripts
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures;
//!
//! fn test_optimize() {
//!     let project = fixtures::create_project().unwrap();
//!     // ...
//! }
//! ```

pub mod fixtures;
pub mod optimizers;

use std::path::Path;

/// Check if running in CI environment
#[allow(dead_code)]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}

/// Check if a POSIX shell is available for the script-based optimizers
#[allow(dead_code)]
pub fn has_sh() -> bool {
    which::which("sh").is_ok()
}

/// Number of entries left in a directory
#[allow(dead_code)]
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Macro to skip tests when no POSIX shell is available
/// In CI, this will fail the test instead of skipping
#[macro_export]
macro_rules! require_sh {
    () => {
        if !$crate::common::has_sh() {
            if $crate::common::is_ci() {
                panic!("sh missing in CI!");
            } else {
                eprintln!("⚠️  Skipping test: sh not found in PATH");
                return;
            }
        }
    };
}
