//! Accumulated filter configuration
//!
//! Everything the caller registers between optimizer runs: base URL,
//! excluded and external modules, path aliases, shims and free-form
//! optimizer options.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::infra::{FileSystem, RealFileSystem};

use super::asset::Asset;

/// Option key that switches the filter into multi-output mode
pub const MODULES_OPTION: &str = "modules";

/// Option key whose value is always replaced by the entry point name
pub const INSERT_REQUIRE_OPTION: &str = "insertRequire";

/// Structured shim entry: dependencies plus the global the script exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Modules that must load before the shimmed script
    #[serde(default)]
    pub deps: Vec<String>,

    /// Global variable exposed by the script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<String>,
}

/// A shim descriptor as registered by the caller
///
/// Accepts both the short form (a bare dependency list) and the structured
/// `{ deps, exports }` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShimDescriptor {
    /// `["jquery", "underscore"]`
    Deps(Vec<String>),
    /// `{ deps = ["jquery"], exports = "Backbone" }`
    Config(ShimConfig),
}

impl ShimDescriptor {
    /// The structured form of this descriptor
    pub fn normalized(&self) -> ShimConfig {
        match self {
            Self::Deps(deps) => ShimConfig {
                deps: deps.clone(),
                exports: None,
            },
            Self::Config(config) => config.clone(),
        }
    }
}

impl From<Vec<String>> for ShimDescriptor {
    fn from(deps: Vec<String>) -> Self {
        Self::Deps(deps)
    }
}

impl From<ShimConfig> for ShimDescriptor {
    fn from(config: ShimConfig) -> Self {
        Self::Config(config)
    }
}

/// One entry of the `modules` option
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    /// Module name, usually an alias-prefixed module id such as `app/main`
    pub name: String,
    /// Every key of the entry, `name` included, in declaration order
    pub fields: Map<String, Value>,
}

impl ModuleDescriptor {
    /// Read a descriptor from a `modules` array element.
    ///
    /// Returns `None` for anything that is not an object with a string `name`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let name = fields.get("name")?.as_str()?.to_string();
        Some(Self {
            name,
            fields: fields.clone(),
        })
    }
}

/// Configuration accumulated across optimizer runs
///
/// # Examples
///
/// ```
/// use rjs_filter::filter::FilterConfig;
/// use serde_json::json;
///
/// let mut config = FilterConfig::new("/srv/web/js");
/// config.add_path("app", "/srv/web/js/app");
/// config.add_external("https://cdn.example.com/jquery.js");
/// config.add_option("optimize", "uglify2");
/// assert!(!config.has_modules());
///
/// config.add_option("modules", json!([{ "name": "app/main" }]));
/// assert!(config.has_modules());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    base_url: String,
    exclude: Vec<String>,
    external: Vec<String>,
    paths: IndexMap<String, String>,
    shim: IndexMap<String, ShimDescriptor>,
    options: IndexMap<String, Value>,
}

impl FilterConfig {
    /// Create an empty configuration for the given base URL
    ///
    /// Named after the r.js setting; in practice this is a filesystem path.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Base URL handed to the optimizer
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Excluded modules, in registration order
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// External modules, in registration order
    pub fn external(&self) -> &[String] {
        &self.external
    }

    /// Registered path aliases
    pub fn paths(&self) -> &IndexMap<String, String> {
        &self.paths
    }

    /// Registered shims
    pub fn shim(&self) -> &IndexMap<String, ShimDescriptor> {
        &self.shim
    }

    /// Free-form optimizer options
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    /// Exclude a module from the optimized output
    pub fn add_exclude(&mut self, module: impl Into<String>) {
        self.exclude.push(module.into());
    }

    /// Treat a module as already available; it is mapped to `empty:`
    pub fn add_external(&mut self, module: impl Into<String>) {
        self.external.push(module.into());
    }

    /// Set an optimizer option, replacing any previous value
    pub fn add_option(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(name.into(), value.into());
    }

    /// Map a module alias to a location, replacing any previous mapping
    pub fn add_path(&mut self, alias: impl Into<String>, location: impl Into<String>) {
        self.paths.insert(alias.into(), location.into());
    }

    /// Replace the whole shim mapping
    pub fn set_shim<K, I>(&mut self, shim: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ShimDescriptor)>,
    {
        self.shim = shim.into_iter().map(|(k, v)| (k.into(), v)).collect();
    }

    /// Whether the options declare several output modules
    pub fn has_modules(&self) -> bool {
        self.options.contains_key(MODULES_OPTION)
    }

    /// Entries of the `modules` option that carry a name
    pub fn modules(&self) -> Vec<ModuleDescriptor> {
        self.options
            .get(MODULES_OPTION)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(ModuleDescriptor::from_value)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Name of the declared module the asset belongs to
    ///
    /// See [`FilterConfig::name_for_asset_with_fs`].
    pub fn name_for_asset(&self, asset: &dyn Asset) -> Option<String> {
        self.name_for_asset_with_fs(asset, &RealFileSystem)
    }

    /// Name of the declared module the asset belongs to, using a custom filesystem
    ///
    /// The asset's source location is canonicalized and matched against the
    /// registered alias directories; the deepest directory containing it wins.
    /// That alias is then expanded in each module name, and the first module
    /// whose expanded name prefixes the source location is returned.
    pub fn name_for_asset_with_fs<FS: FileSystem>(
        &self,
        asset: &dyn Asset,
        fs: &FS,
    ) -> Option<String> {
        let location = fs.canonicalize(&asset.source_location()?).ok()?;
        let alias = self.alias_containing(&location, fs);
        let location = location.to_string_lossy();

        self.modules()
            .into_iter()
            .find(|module| {
                let expanded = match &alias {
                    Some((alias, dir)) => expand_alias(&module.name, alias, dir),
                    None => module.name.clone(),
                };
                location.starts_with(&expanded)
            })
            .map(|module| module.name)
    }

    fn alias_containing<FS: FileSystem>(
        &self,
        location: &Path,
        fs: &FS,
    ) -> Option<(String, PathBuf)> {
        let mut best: Option<(String, PathBuf)> = None;

        for (alias, target) in &self.paths {
            let Ok(dir) = fs.canonicalize(&self.resolve_location(target)) else {
                continue;
            };
            if !location.starts_with(&dir) {
                continue;
            }
            let deeper = best
                .as_ref()
                .is_none_or(|(_, current)| dir.components().count() > current.components().count());
            if deeper {
                best = Some((alias.clone(), dir));
            }
        }

        best
    }

    /// Alias locations are relative to the base URL unless absolute
    fn resolve_location(&self, location: &str) -> PathBuf {
        let location = Path::new(location);
        if location.is_absolute() {
            location.to_path_buf()
        } else {
            Path::new(&self.base_url).join(location)
        }
    }
}

fn expand_alias(name: &str, alias: &str, dir: &Path) -> String {
    if name == alias {
        return dir.to_string_lossy().into_owned();
    }
    match name.strip_prefix(alias).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => dir.join(rest).to_string_lossy().into_owned(),
        None => name.to_string(),
    }
}
