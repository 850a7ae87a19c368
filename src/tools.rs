//! Tool detection and verification module
//!
//! Detects the programs an optimizer run depends on:
//! - the interpreter (usually node), when one is configured
//! - the r.js optimizer script

use crate::filter::OptimizerCommand;
use crate::fmt::{CHECKMARK, CROSSMARK, WRENCH};
use crate::infra::{CommandExecutor, RealCommandExecutor};
use console::style;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during tool operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// I/O error during tool execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool execution failed
    #[error("Failed to get version for {0}")]
    VersionFailed(String),

    /// Required tool is missing
    #[error("Required tool missing: {tool} ({})", program.display())]
    MissingTool {
        /// Human-readable name
        tool: String,
        /// Path or command that could not be resolved
        program: PathBuf,
    },
}

/// A program with detection capabilities
///
/// # Examples
///
/// ```no_run
/// use rjs_filter::tools::{Tool, ToolStatus};
///
/// let node = Tool::new("Node.js", "node", "--version");
/// if let ToolStatus::Available(version) = node.check() {
///     println!("node {}", version);
/// }
/// ```
#[derive(Debug)]
pub struct Tool<CE: CommandExecutor = RealCommandExecutor> {
    /// Human-readable name
    pub name: &'static str,
    /// Binary name in PATH, or path to a script
    pub binary: PathBuf,
    /// Program that runs `binary` when it is a script
    pub launcher: Option<PathBuf>,
    /// Flag to get version (e.g., "--version")
    pub version_flag: &'static str,
    /// Command executor for running version checks
    cmd_executor: CE,
}

impl<CE: CommandExecutor> Tool<CE> {
    /// Create a new Tool with a custom command executor
    pub fn with_executor(
        name: &'static str,
        binary: impl Into<PathBuf>,
        version_flag: &'static str,
        cmd_executor: CE,
    ) -> Self {
        Self {
            name,
            binary: binary.into(),
            launcher: None,
            version_flag,
            cmd_executor,
        }
    }

    /// Run `binary` through `launcher` instead of executing it
    pub fn launched_by(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Check if the tool is available
    ///
    /// Executables are looked up in PATH; scripts run by a launcher only need to exist.
    pub fn is_installed(&self) -> bool {
        match self.launcher {
            Some(_) => self.binary.is_file(),
            None => which::which(&self.binary).is_ok(),
        }
    }

    /// Get the version string of the installed tool
    pub fn version(&self) -> Result<String, ToolError> {
        let (program, args) = self.version_command();
        let output = self.cmd_executor.execute(|cmd| cmd.args(&args), program)?;

        if !output.status.success() {
            return Err(ToolError::VersionFailed(self.name.to_string()));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(version)
    }

    fn version_command(&self) -> (&PathBuf, Vec<OsString>) {
        match &self.launcher {
            Some(launcher) => (
                launcher,
                vec![self.binary.clone().into_os_string(), self.version_flag.into()],
            ),
            None => (&self.binary, vec![self.version_flag.into()]),
        }
    }

    /// Check and report the tool status
    pub fn check(&self) -> ToolStatus {
        if self.is_installed() {
            match self.version() {
                Ok(version) if !version.is_empty() => ToolStatus::Available(version),
                _ => ToolStatus::InstalledButVersionUnknown,
            }
        } else {
            ToolStatus::Missing
        }
    }
}

impl Tool<RealCommandExecutor> {
    /// Create a new Tool with real command execution
    pub fn new(name: &'static str, binary: impl Into<PathBuf>, version_flag: &'static str) -> Self {
        Self::with_executor(name, binary, version_flag, RealCommandExecutor)
    }
}

/// Status of a tool check
#[derive(Debug)]
pub enum ToolStatus {
    /// Tool is available and version was successfully retrieved
    Available(String),
    /// Tool exists but version check failed
    InstalledButVersionUnknown,
    /// Tool not found
    Missing,
}

/// Everything an [`OptimizerCommand`] needs to run
pub struct OptimizerTools<CE: CommandExecutor = RealCommandExecutor> {
    /// Interpreter, absent when the optimizer is executed directly
    pub interpreter: Option<Tool<CE>>,
    /// r.js
    pub optimizer: Tool<CE>,
}

impl OptimizerTools<RealCommandExecutor> {
    /// Create the tool set for `command` with real command execution
    pub fn new(command: &OptimizerCommand) -> Self {
        Self::with_executor(command, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor + Clone> OptimizerTools<CE> {
    /// Create the tool set for `command` with a custom command executor
    pub fn with_executor(command: &OptimizerCommand, cmd_executor: CE) -> Self {
        let optimizer = Tool::with_executor("r.js", &command.script, "-v", cmd_executor.clone());
        match &command.interpreter {
            Some(interpreter) => Self {
                interpreter: Some(Tool::with_executor(
                    "interpreter",
                    interpreter,
                    "--version",
                    cmd_executor,
                )),
                optimizer: optimizer.launched_by(interpreter),
            },
            None => Self {
                interpreter: None,
                optimizer,
            },
        }
    }
}

impl<CE: CommandExecutor> OptimizerTools<CE> {
    /// Tools in the order they are checked
    pub fn tools(&self) -> Vec<&Tool<CE>> {
        self.interpreter
            .iter()
            .chain(std::iter::once(&self.optimizer))
            .collect()
    }

    /// Check all tools and report their status
    ///
    /// # Errors
    /// Returns [`ToolError::MissingTool`] for the first tool that cannot be found
    pub fn check_all(&self) -> Result<(), ToolError> {
        println!("\n{} Checking optimizer tools...", WRENCH);

        let mut missing = None;
        for tool in self.tools() {
            match tool.check() {
                ToolStatus::Available(version) => {
                    println!(
                        "   {} {} ({}) - {}",
                        CHECKMARK,
                        style(tool.name).bold(),
                        tool.binary.display(),
                        style(version).dim()
                    );
                }
                ToolStatus::InstalledButVersionUnknown => {
                    println!(
                        "   {} {} ({}) - {}",
                        CHECKMARK,
                        style(tool.name).bold(),
                        tool.binary.display(),
                        style("(version unknown)").dim()
                    );
                }
                ToolStatus::Missing => {
                    println!(
                        "   {} {} ({}) - {}",
                        CROSSMARK,
                        style(tool.name).bold(),
                        tool.binary.display(),
                        style("NOT FOUND").red()
                    );
                    missing.get_or_insert(ToolError::MissingTool {
                        tool: tool.name.to_string(),
                        program: tool.binary.clone(),
                    });
                }
            }
        }

        match missing {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::mock_exit_status;
    use std::io;
    use std::process::{Command, Output};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // Mock CommandExecutor for testing
    #[derive(Clone)]
    struct MockCommandExecutor {
        exit_code: i32,
        stdout: &'static str,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockCommandExecutor {
        fn new(exit_code: i32, stdout: &'static str) -> Self {
            Self {
                exit_code,
                stdout,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for MockCommandExecutor {
        fn output(&self, cmd: &mut Command) -> io::Result<Output> {
            let mut call = vec![cmd.get_program().to_string_lossy().into_owned()];
            call.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
            self.calls.lock().unwrap().push(call);

            Ok(Output {
                status: mock_exit_status(self.exit_code),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: vec![],
            })
        }
    }

    fn script(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("r.js");
        std::fs::write(&path, "// r.js").unwrap();
        path
    }

    #[test]
    fn test_version_of_executable() {
        let mock = MockCommandExecutor::new(0, "v20.11.1\n");
        let tool = Tool::with_executor("interpreter", "node", "--version", mock.clone());

        assert_eq!(tool.version().unwrap(), "v20.11.1");
        assert_eq!(mock.calls(), vec![vec!["node", "--version"]]);
    }

    #[test]
    fn test_version_of_launched_script() {
        let mock = MockCommandExecutor::new(0, "r.js: 2.3.6, RequireJS: 2.3.6\n");
        let tool = Tool::with_executor("r.js", "/opt/r.js", "-v", mock.clone())
            .launched_by("/usr/bin/node");

        assert!(tool.version().unwrap().starts_with("r.js: 2.3.6"));
        assert_eq!(
            mock.calls(),
            vec![vec!["/usr/bin/node", "/opt/r.js", "-v"]]
        );
    }

    #[test]
    fn test_version_failure() {
        let mock = MockCommandExecutor::new(1, "");
        let tool = Tool::with_executor("interpreter", "node", "--version", mock);

        assert!(matches!(tool.version(), Err(ToolError::VersionFailed(_))));
    }

    #[test]
    fn test_launched_script_is_installed_when_file_exists() {
        let temp = TempDir::new().unwrap();
        let mock = MockCommandExecutor::new(0, "r.js: 2.3.6\n");

        let present = Tool::with_executor("r.js", script(&temp), "-v", mock.clone())
            .launched_by("node");
        assert!(present.is_installed());
        assert!(matches!(present.check(), ToolStatus::Available(_)));

        let absent = Tool::with_executor("r.js", temp.path().join("missing.js"), "-v", mock)
            .launched_by("node");
        assert!(!absent.is_installed());
        assert!(matches!(absent.check(), ToolStatus::Missing));
    }

    #[test]
    fn test_empty_version_output_is_unknown() {
        let temp = TempDir::new().unwrap();
        let mock = MockCommandExecutor::new(0, "");
        let tool = Tool::with_executor("r.js", script(&temp), "-v", mock).launched_by("node");

        assert!(matches!(
            tool.check(),
            ToolStatus::InstalledButVersionUnknown
        ));
    }

    #[test]
    fn test_tool_is_installed_with_nonexistent_binary_returns_false() {
        let tool = Tool::new("missing", "nonexistent-tool-xyz-123", "--version");
        assert!(!tool.is_installed());
        assert!(matches!(tool.check(), ToolStatus::Missing));
    }

    #[test]
    fn test_optimizer_tools_with_interpreter() {
        let command = OptimizerCommand::new("/usr/bin/node", "/opt/r.js");
        let tools = OptimizerTools::with_executor(&command, MockCommandExecutor::new(0, ""));

        let interpreter = tools.interpreter.as_ref().unwrap();
        assert_eq!(interpreter.binary, PathBuf::from("/usr/bin/node"));
        assert_eq!(
            tools.optimizer.launcher,
            Some(PathBuf::from("/usr/bin/node"))
        );
        assert_eq!(tools.tools().len(), 2);
    }

    #[test]
    fn test_optimizer_tools_direct() {
        let command = OptimizerCommand::direct("/opt/r.js");
        let tools = OptimizerTools::with_executor(&command, MockCommandExecutor::new(0, ""));

        assert!(tools.interpreter.is_none());
        assert!(tools.optimizer.launcher.is_none());
        assert_eq!(tools.tools().len(), 1);
    }

    #[test]
    fn test_check_all_reports_missing_optimizer() {
        let temp = TempDir::new().unwrap();
        let command = OptimizerCommand::new(
            "nonexistent-interpreter-xyz",
            temp.path().join("missing-r.js"),
        );
        let tools = OptimizerTools::with_executor(&command, MockCommandExecutor::new(0, "v1\n"));

        match tools.check_all() {
            Err(ToolError::MissingTool { tool, .. }) => assert_eq!(tool, "interpreter"),
            other => panic!("Expected MissingTool, got {:?}", other),
        }
    }
}
