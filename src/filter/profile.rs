//! Build profile synthesis
//!
//! Turns a [`FilterConfig`] plus one asset into the document r.js reads via
//! `-o`. Keys are assembled in a fixed order and later steps overwrite
//! earlier ones:
//! 1. `baseUrl`, `paths`, `name` (content digest), `out`
//! 2. `paths[external] = "empty:"` for every external
//! 3. `paths[name] = <input file>`
//! 4. registered path aliases
//! 5. `shim` (normalized) and `exclude`
//! 6. free-form options, with `insertRequire` forced to the entry point name
//! 7. in multi-output mode, the matching `modules` entry is overlaid and
//!    `modules` itself is dropped

use log::debug;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::infra::{FileSystem, RealFileSystem};

use super::asset::Asset;
use super::config::{FilterConfig, INSERT_REQUIRE_OPTION, MODULES_OPTION};
use super::error::OptimizeError;

/// Value r.js treats as "already loaded, do not bundle"
pub const EMPTY_PATH: &str = "empty:";

/// Entry point name for a piece of source: the hex SHA-256 of its bytes.
///
/// # Examples
///
/// ```
/// use rjs_filter::filter::entry_point_name;
///
/// let name = entry_point_name(b"define([], 1);");
/// assert_eq!(name.len(), 64);
/// assert_eq!(name, entry_point_name(b"define([], 1);"));
/// ```
pub fn entry_point_name(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// A build profile ready to be written out for the optimizer
#[derive(Debug, Clone, PartialEq)]
pub struct BuildProfile {
    document: Map<String, Value>,
}

impl BuildProfile {
    /// Entry point the optimizer starts from
    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// Look up a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Top-level keys in serialization order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// The underlying document
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Render the profile file contents: the JSON document wrapped in parentheses.
    ///
    /// r.js evaluates build files as JavaScript, so the object literal has to
    /// be an expression.
    pub fn to_profile_text(&self) -> Result<String, serde_json::Error> {
        Ok(format!("({})", serde_json::to_string(&self.document)?))
    }
}

/// Builds a [`BuildProfile`] for one asset
pub struct ProfileBuilder<'a, FS: FileSystem = RealFileSystem> {
    config: &'a FilterConfig,
    fs: &'a FS,
}

impl<'a> ProfileBuilder<'a> {
    /// Create a builder resolving module names against the real filesystem
    pub fn new(config: &'a FilterConfig) -> Self {
        Self::with_fs(config, &RealFileSystem)
    }
}

impl<'a, FS: FileSystem> ProfileBuilder<'a, FS> {
    /// Create a builder with a custom filesystem implementation
    pub fn with_fs(config: &'a FilterConfig, fs: &'a FS) -> Self {
        Self { config, fs }
    }

    /// Build the profile for `asset`, whose content lives in `input` and whose
    /// optimized result should land in `output`.
    ///
    /// # Errors
    /// Returns [`OptimizeError::UnresolvedModule`] in multi-output mode when
    /// the asset belongs to none of the declared modules, and
    /// [`OptimizeError::Serialize`] if a shim entry cannot be converted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjs_filter::filter::{FilterConfig, ProfileBuilder, SourceAsset};
    /// use std::path::Path;
    ///
    /// let mut config = FilterConfig::new("/srv/web/js");
    /// config.add_external("jquery");
    ///
    /// let asset = SourceAsset::new("define(['jquery'], function ($) {});");
    /// let profile = ProfileBuilder::new(&config)
    ///     .build(Path::new("/tmp/input1"), Path::new("/tmp/output1"), &asset)?;
    ///
    /// assert_eq!(profile.get("paths").unwrap()["jquery"], "empty:");
    /// assert!(profile.to_profile_text()?.starts_with("({\"baseUrl\""));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build(
        &self,
        input: &Path,
        output: &Path,
        asset: &dyn Asset,
    ) -> Result<BuildProfile, OptimizeError> {
        let name = entry_point_name(asset.content().as_bytes());

        let mut paths = Map::new();
        for external in self.config.external() {
            paths.insert(external.clone(), Value::from(EMPTY_PATH));
        }
        paths.insert(name.clone(), Value::from(input.to_string_lossy()));
        for (alias, location) in self.config.paths() {
            paths.insert(alias.clone(), Value::from(location.as_str()));
        }

        let mut shim = Map::new();
        for (alias, descriptor) in self.config.shim() {
            shim.insert(alias.clone(), serde_json::to_value(descriptor.normalized())?);
        }

        let mut document = Map::new();
        document.insert("baseUrl".into(), Value::from(self.config.base_url()));
        document.insert("paths".into(), Value::Object(paths));
        document.insert("name".into(), Value::from(name.as_str()));
        document.insert("out".into(), Value::from(output.to_string_lossy()));
        document.insert("shim".into(), Value::Object(shim));
        document.insert(
            "exclude".into(),
            Value::from(self.config.exclude().to_vec()),
        );

        for (option, value) in self.config.options() {
            // https://github.com/jrburke/requirejs/wiki/Upgrading-to-RequireJS-2.0#wiki-delayed
            let value = if option == INSERT_REQUIRE_OPTION {
                Value::from(name.as_str())
            } else {
                value.clone()
            };
            document.insert(option.clone(), value);
        }

        if self.config.has_modules() {
            self.apply_module(&mut document, asset)?;
        }

        debug!(
            "Built profile for entry point {} ({} keys)",
            document
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            document.len()
        );

        Ok(BuildProfile { document })
    }

    fn apply_module(
        &self,
        document: &mut Map<String, Value>,
        asset: &dyn Asset,
    ) -> Result<(), OptimizeError> {
        let module_name = self
            .config
            .name_for_asset_with_fs(asset, self.fs)
            .ok_or_else(|| OptimizeError::UnresolvedModule {
                source_location: asset.source_location(),
            })?;

        document.insert("name".into(), Value::from(module_name.as_str()));
        for module in self.config.modules() {
            if module.name == module_name {
                for (key, value) in module.fields {
                    document.insert(key, value);
                }
            }
        }
        document.shift_remove(MODULES_OPTION);

        Ok(())
    }
}
