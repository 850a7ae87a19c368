//! Configuration for rjs-filter
//!
//! This module provides:
//! - .rjs-filter.toml config file support
//! - Conversion into a [`FilterConfig`](crate::filter::FilterConfig) and an
//!   [`OptimizerCommand`](crate::filter::OptimizerCommand)

pub mod file;
pub mod loader;

pub use file::{ConfigFile, CONFIG_FILE_NAME};
pub use loader::ConfigLoader;
