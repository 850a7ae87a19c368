//! Configuration file data structures

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::filter::config::MODULES_OPTION;
use crate::filter::{FilterConfig, ModuleDescriptor, OptimizerCommand, ShimDescriptor};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".rjs-filter.toml";

/// rjs-filter configuration file structure
///
/// ```toml
/// base-url = "js"
/// interpreter = "node"
/// optimizer = "node_modules/requirejs/bin/r.js"
/// external = ["jquery"]
///
/// [paths]
/// app = "app"
///
/// [shim]
/// backbone = { deps = ["underscore"], exports = "Backbone" }
///
/// [options]
/// optimize = "uglify2"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Directory module ids are resolved against
    #[serde(default)]
    pub base_url: String,

    /// Program that runs the optimizer script; omit to execute the script directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Path to r.js
    #[serde(default)]
    pub optimizer: String,

    /// Modules left out of every build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Modules provided at runtime (mapped to `empty:`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,

    /// Path aliases (alias → location)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, String>,

    /// Shim descriptors for non-AMD scripts
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub shim: IndexMap<String, ShimDescriptor>,

    /// Free-form r.js options, passed through as-is
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, Value>,
}

impl ConfigFile {
    /// Configuration written by `rjs-filter init`
    pub fn starter() -> Self {
        let mut options = IndexMap::new();
        options.insert("optimize".to_string(), Value::from("uglify2"));
        options.insert("preserveLicenseComments".to_string(), Value::from(false));

        Self {
            base_url: "js".to_string(),
            interpreter: Some("node".to_string()),
            optimizer: "node_modules/requirejs/bin/r.js".to_string(),
            options,
            ..Default::default()
        }
    }

    /// Check required keys and the shape of `options.modules`
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("'base-url' must not be empty");
        }
        if self.optimizer.trim().is_empty() {
            bail!("'optimizer' must not be empty");
        }

        if let Some(modules) = self.options.get(MODULES_OPTION) {
            let Value::Array(entries) = modules else {
                bail!("'options.modules' must be an array of tables");
            };
            for (index, entry) in entries.iter().enumerate() {
                if ModuleDescriptor::from_value(entry).is_none() {
                    bail!(
                        "'options.modules' entry {} needs a string 'name'",
                        index + 1
                    );
                }
            }
        }

        Ok(())
    }

    /// Build the filter configuration, resolving `base-url` against `root`
    pub fn filter_config(&self, root: &Path) -> FilterConfig {
        let mut config = FilterConfig::new(root.join(&self.base_url).to_string_lossy());

        for module in &self.exclude {
            config.add_exclude(module.as_str());
        }
        for module in &self.external {
            config.add_external(module.as_str());
        }
        for (alias, location) in &self.paths {
            config.add_path(alias.as_str(), location.as_str());
        }
        config.set_shim(self.shim.clone());
        for (name, value) in &self.options {
            config.add_option(name.as_str(), value.clone());
        }

        config
    }

    /// Build the optimizer command, resolving path-like values against `root`
    pub fn optimizer_command(&self, root: &Path) -> OptimizerCommand {
        let script = resolve_command_path(root, &self.optimizer);
        match self.interpreter.as_deref() {
            Some(interpreter) => {
                OptimizerCommand::new(resolve_command_path(root, interpreter), script)
            }
            None => OptimizerCommand::direct(script),
        }
    }
}

/// Bare names (`node`) stay `PATH` lookups; relative paths are anchored at `root`
fn resolve_command_path(root: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_relative() && path.components().count() > 1 {
        root.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ShimConfig;
    use serde_json::json;

    const FULL: &str = r#"
base-url = "public/js"
interpreter = "node"
optimizer = "tools/r.js"
exclude = ["text"]
external = ["jquery", "https://cdn.example.com/lodash.js"]

[paths]
app = "app"
vendor = "../vendor"

[shim]
underscore = []
backbone = { deps = ["underscore", "jquery"], exports = "Backbone" }

[options]
optimize = "uglify2"
preserveLicenseComments = false

[[options.modules]]
name = "app/main"
include = ["app/boot"]
"#;

    fn parse(text: &str) -> ConfigFile {
        toml_edit::de::from_str(text).unwrap()
    }

    #[test]
    fn test_parses_every_key() {
        let config = parse(FULL);

        assert_eq!(config.base_url, "public/js");
        assert_eq!(config.interpreter.as_deref(), Some("node"));
        assert_eq!(config.optimizer, "tools/r.js");
        assert_eq!(config.exclude, vec!["text"]);
        assert_eq!(config.external.len(), 2);
        assert_eq!(config.paths.get("vendor").map(String::as_str), Some("../vendor"));
        assert_eq!(
            config.shim.get("underscore"),
            Some(&ShimDescriptor::Deps(vec![]))
        );
        assert_eq!(
            config.shim.get("backbone"),
            Some(&ShimDescriptor::Config(ShimConfig {
                deps: vec!["underscore".to_string(), "jquery".to_string()],
                exports: Some("Backbone".to_string()),
            }))
        );
        assert_eq!(
            config.options.get("modules"),
            Some(&json!([{ "name": "app/main", "include": ["app/boot"] }]))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preserves_declaration_order() {
        let config = parse(FULL);

        let aliases: Vec<_> = config.paths.keys().map(String::as_str).collect();
        assert_eq!(aliases, vec!["app", "vendor"]);
        let options: Vec<_> = config.options.keys().map(String::as_str).collect();
        assert_eq!(options, vec!["optimize", "preserveLicenseComments", "modules"]);
    }

    #[test]
    fn test_validate_requires_base_url_and_optimizer() {
        let missing_base = parse("optimizer = \"r.js\"");
        let err = missing_base.validate().unwrap_err();
        assert!(err.to_string().contains("base-url"));

        let missing_optimizer = parse("base-url = \"js\"");
        let err = missing_optimizer.validate().unwrap_err();
        assert!(err.to_string().contains("optimizer"));
    }

    #[test]
    fn test_validate_rejects_modules_without_name() {
        let config = parse(
            r#"
base-url = "js"
optimizer = "r.js"

[[options.modules]]
name = "app/main"

[[options.modules]]
include = ["app/orphan"]
"#,
        );

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("entry 2"));
    }

    #[test]
    fn test_validate_rejects_non_array_modules() {
        let config = parse(
            r#"
base-url = "js"
optimizer = "r.js"

[options]
modules = "app/main"
"#,
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_config_resolves_base_url_and_keeps_knobs() {
        let config = parse(FULL).filter_config(Path::new("/srv/site"));

        assert_eq!(config.base_url(), "/srv/site/public/js");
        assert_eq!(config.exclude(), ["text".to_string()]);
        assert_eq!(config.external()[0], "jquery");
        assert_eq!(config.paths().get("app").map(String::as_str), Some("app"));
        assert_eq!(config.shim().len(), 2);
        assert!(config.has_modules());
        assert_eq!(config.modules()[0].name, "app/main");
    }

    #[test]
    fn test_filter_config_keeps_absolute_base_url() {
        let mut file = ConfigFile::starter();
        file.base_url = "/var/www/js".to_string();

        let config = file.filter_config(Path::new("/srv/site"));
        assert_eq!(config.base_url(), "/var/www/js");
    }

    #[test]
    fn test_optimizer_command_resolution() {
        let config = parse(FULL);
        let command = config.optimizer_command(Path::new("/srv/site"));

        assert_eq!(command.interpreter, Some(PathBuf::from("node")));
        assert_eq!(command.script, PathBuf::from("/srv/site/tools/r.js"));
    }

    #[test]
    fn test_optimizer_command_without_interpreter_runs_directly() {
        let config = parse("base-url = \"js\"\noptimizer = \"/usr/local/bin/r.js\"");
        let command = config.optimizer_command(Path::new("/srv/site"));

        assert_eq!(command, OptimizerCommand::direct("/usr/local/bin/r.js"));
    }

    #[test]
    fn test_empty_interpreter_means_direct() {
        let config = parse("base-url = \"js\"\ninterpreter = \"\"\noptimizer = \"bin/r.js\"");
        let command = config.optimizer_command(Path::new("/srv"));

        assert_eq!(command.interpreter, None);
        assert_eq!(command.program(), Path::new("/srv/bin/r.js"));
    }

    #[test]
    fn test_relative_interpreter_with_separator_is_anchored() {
        let config =
            parse("base-url = \"js\"\ninterpreter = \"./bin/node\"\noptimizer = \"r.js\"");
        let command = config.optimizer_command(Path::new("/srv"));

        assert_eq!(command.interpreter, Some(PathBuf::from("/srv/./bin/node")));
        assert_eq!(command.script, PathBuf::from("r.js"));
    }

    #[test]
    fn test_starter_is_valid() {
        let starter = ConfigFile::starter();
        assert!(starter.validate().is_ok());
        assert_eq!(starter.options.get("optimize"), Some(&json!("uglify2")));
    }
}
