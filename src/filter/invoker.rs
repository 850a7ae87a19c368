//! Optimizer invocation
//!
//! Writes the asset to a temp input file, generates the build profile,
//! runs r.js on it and swaps the asset content for the optimized output.
//! Every temp file is removed before `dump` returns, whatever the outcome.

use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

use super::asset::Asset;
use super::config::FilterConfig;
use super::error::OptimizeError;
use super::profile::{BuildProfile, ProfileBuilder};
use super::Filter;

/// Exit code shells use for "command not found"
const COMMAND_NOT_FOUND: i32 = 127;

/// How to launch the optimizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerCommand {
    /// Interpreter to run the script with (usually node); `None` runs the script directly
    pub interpreter: Option<PathBuf>,
    /// Path to r.js
    pub script: PathBuf,
}

impl OptimizerCommand {
    /// Run `script` through `interpreter`. An empty interpreter runs the script directly.
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        let interpreter = interpreter.into();
        Self {
            interpreter: (!interpreter.as_os_str().is_empty()).then_some(interpreter),
            script: script.into(),
        }
    }

    /// Run `script` as an executable
    pub fn direct(script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            script: script.into(),
        }
    }

    /// Program that gets spawned
    pub fn program(&self) -> &Path {
        self.interpreter.as_deref().unwrap_or(&self.script)
    }

    /// Arguments passed to [`OptimizerCommand::program`] for a given profile file
    pub fn args(&self, profile: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(3);
        if self.interpreter.is_some() {
            args.push(self.script.clone().into_os_string());
        }
        args.push("-o".into());
        args.push(profile.as_os_str().to_owned());
        args
    }
}

/// The r.js filter
///
/// # Examples
///
/// ```no_run
/// use rjs_filter::filter::{FilterConfig, OptimizerCommand, RjsFilter, SourceAsset};
///
/// let mut config = FilterConfig::new("/srv/web/js");
/// config.add_path("app", "/srv/web/js/app");
/// config.add_option("optimize", "uglify2");
///
/// let filter = RjsFilter::new(
///     OptimizerCommand::new("/usr/bin/node", "/usr/lib/node_modules/requirejs/bin/r.js"),
///     config,
/// );
///
/// let mut asset = SourceAsset::load("/srv/web/js", "app/main.js", &rjs_filter::infra::RealFileSystem)?;
/// filter.dump(&mut asset)?;
/// println!("{}", asset.into_content());
/// # Ok::<(), rjs_filter::filter::OptimizeError>(())
/// ```
pub struct RjsFilter<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor> {
    command: OptimizerCommand,
    config: FilterConfig,
    temp_dir: PathBuf,
    fs: FS,
    cmd_executor: CE,
}

impl RjsFilter {
    /// Create a filter using the real filesystem and process spawning
    pub fn new(command: OptimizerCommand, config: FilterConfig) -> Self {
        Self::with_executors(command, config, RealFileSystem, RealCommandExecutor)
    }
}

impl<FS: FileSystem, CE: CommandExecutor> RjsFilter<FS, CE> {
    /// Create a filter with custom filesystem and command executor implementations
    pub fn with_executors(
        command: OptimizerCommand,
        config: FilterConfig,
        fs: FS,
        cmd_executor: CE,
    ) -> Self {
        Self {
            command,
            config,
            temp_dir: std::env::temp_dir(),
            fs,
            cmd_executor,
        }
    }

    /// Create temp artifacts in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Optimizer launch settings
    pub fn command(&self) -> &OptimizerCommand {
        &self.command
    }

    /// Accumulated configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Mutable access for registering excludes, paths, shims and options
    pub fn config_mut(&mut self) -> &mut FilterConfig {
        &mut self.config
    }

    /// Directory temp artifacts are created in
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Build the profile that [`RjsFilter::dump`] would hand to the optimizer
    pub fn build_profile(
        &self,
        input: &Path,
        output: &Path,
        asset: &dyn Asset,
    ) -> Result<BuildProfile, OptimizeError> {
        ProfileBuilder::with_fs(&self.config, &self.fs).build(input, output, asset)
    }

    /// Run the optimizer over `asset` and replace its content with the result.
    ///
    /// On error the asset is left untouched and no temp file survives.
    ///
    /// # Errors
    /// - [`OptimizeError::InterpreterNotFound`]: the program could not be spawned, or exited with 127
    /// - [`OptimizeError::OptimizerFailure`]: any other non-zero exit
    /// - [`OptimizeError::OutputMissing`]: zero exit but no output file
    /// - [`OptimizeError::UnresolvedModule`]: multi-output mode and no module matches the asset
    pub fn dump(&self, asset: &mut dyn Asset) -> Result<(), OptimizeError> {
        let mut artifacts = TempArtifacts::new(&self.fs, &self.temp_dir);

        let input = artifacts.create("input")?;
        let output = artifacts.create("output")?;
        self.fs
            .write(&input, asset.content())
            .map_err(|e| OptimizeError::io("writing optimizer input file", e))?;

        let profile = self.build_profile(&input, &output, asset)?;
        let profile_path = artifacts.create("build_profile")?;
        self.fs
            .write(&profile_path, profile.to_profile_text()?)
            .map_err(|e| OptimizeError::io("writing build profile", e))?;

        let program = self.command.program().to_path_buf();
        let args = self.command.args(&profile_path);
        info!(
            "Running {} {}",
            program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let result = self.cmd_executor.execute(|cmd| cmd.args(&args), &program);

        artifacts.remove(&input);

        let process = match result {
            Ok(process) => process,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                artifacts.cleanup();
                return Err(OptimizeError::InterpreterNotFound { program });
            }
            Err(e) => {
                artifacts.cleanup();
                return Err(OptimizeError::io(
                    format!("spawning {}", program.display()),
                    e,
                ));
            }
        };

        debug!("Optimizer exited with {}", process.status);
        match process.status.code() {
            Some(0) => {}
            Some(COMMAND_NOT_FOUND) => {
                artifacts.cleanup();
                return Err(OptimizeError::InterpreterNotFound { program });
            }
            exit_code => {
                artifacts.cleanup();
                return Err(OptimizeError::OptimizerFailure {
                    exit_code,
                    stdout: String::from_utf8_lossy(&process.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&process.stderr).into_owned(),
                    input: asset.content().to_string(),
                });
            }
        }

        if !self.fs.exists(&output) {
            artifacts.cleanup();
            return Err(OptimizeError::OutputMissing { path: output });
        }

        let optimized = self
            .fs
            .read_to_string(&output)
            .map_err(|e| OptimizeError::io("reading optimizer output file", e))?;
        asset.set_content(optimized);

        artifacts.cleanup();
        Ok(())
    }
}

impl<FS: FileSystem, CE: CommandExecutor> Filter for RjsFilter<FS, CE> {
    fn filter_dump(&self, asset: &mut dyn Asset) -> Result<(), OptimizeError> {
        self.dump(asset)
    }
}

/// Temp files owned by one `dump` call
///
/// Removal is existence-checked, so it can run at any point; whatever is
/// still tracked when this is dropped gets removed too.
struct TempArtifacts<'a, FS: FileSystem> {
    fs: &'a FS,
    dir: &'a Path,
    files: Vec<PathBuf>,
}

impl<'a, FS: FileSystem> TempArtifacts<'a, FS> {
    fn new(fs: &'a FS, dir: &'a Path) -> Self {
        Self {
            fs,
            dir,
            files: Vec::with_capacity(3),
        }
    }

    fn create(&mut self, prefix: &str) -> Result<PathBuf, OptimizeError> {
        let path = self.fs.create_temp_file(self.dir, prefix).map_err(|e| {
            OptimizeError::io(
                format!("creating {} file in {}", prefix, self.dir.display()),
                e,
            )
        })?;
        debug!("Created temp file {}", path.display());
        self.files.push(path.clone());
        Ok(path)
    }

    fn remove(&mut self, path: &Path) {
        self.files.retain(|tracked| tracked != path);
        if !self.fs.exists(path) {
            return;
        }
        if let Err(e) = self.fs.remove_file(path) {
            warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }

    fn cleanup(&mut self) {
        for path in std::mem::take(&mut self.files) {
            self.remove(&path);
        }
    }
}

impl<FS: FileSystem> Drop for TempArtifacts<'_, FS> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
