#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! rjs-filter library
//!
//! Bridges an asset pipeline to the RequireJS optimizer (r.js): builds a
//! build profile for each asset, runs the optimizer as a subprocess and
//! hands the optimized content back. It can be used programmatically in
//! addition to the CLI interface.
//!
//! # Basic Example
//!
//! Building the profile r.js would receive for an asset:
//!
//! ```
//! use rjs_filter::filter::{FilterConfig, ProfileBuilder, ShimConfig, SourceAsset};
//! use std::path::Path;
//!
//! let mut config = FilterConfig::new("/srv/web/js");
//! config.add_external("jquery");
//! config.add_path("app", "/srv/web/js/app");
//! config.set_shim([(
//!     "backbone",
//!     ShimConfig {
//!         deps: vec!["underscore".to_string()],
//!         exports: Some("Backbone".to_string()),
//!     }
//!     .into(),
//! )]);
//! config.add_option("optimize", "uglify2");
//!
//! let asset = SourceAsset::new("require(['app/main']);");
//! let profile = ProfileBuilder::new(&config).build(
//!     Path::new("/tmp/input1"),
//!     Path::new("/tmp/output1"),
//!     &asset,
//! )?;
//!
//! let keys: Vec<_> = profile.keys().collect();
//! assert_eq!(
//!     keys,
//!     ["baseUrl", "paths", "name", "out", "shim", "exclude", "optimize"]
//! );
//! # Ok::<(), rjs_filter::filter::OptimizeError>(())
//! ```
//!
//! # Advanced Example: Running the Optimizer
//!
//! ```no_run
//! use rjs_filter::filter::{Asset, Filter, FilterConfig, OptimizerCommand, RjsFilter, SourceAsset};
//!
//! let filter = RjsFilter::new(
//!     OptimizerCommand::new("node", "node_modules/requirejs/bin/r.js"),
//!     FilterConfig::new("js"),
//! );
//!
//! let mut asset = SourceAsset::new("define(['jquery'], function ($) { return $; });");
//! filter.filter_dump(&mut asset)?;
//! println!("{}", asset.content());
//! # Ok::<(), rjs_filter::filter::OptimizeError>(())
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// Configuration file management
pub mod config;
/// Application error types with contextual suggestions
pub mod error;
/// r.js build profile generation and optimizer invocation
pub mod filter;
/// Shared formatting utilities
pub mod fmt;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Interpreter and optimizer detection
pub mod tools;
