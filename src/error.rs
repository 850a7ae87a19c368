//! Application error types with contextual suggestions
//!
//! Wraps library errors with what the CLI needs on top:
//! - Actionable suggestions
//! - Documentation links
//! - Exit codes following sysexits.h conventions
//!
//! # Examples
//!
//! ```no_run
//! use rjs_filter::config::ConfigLoader;
//! use rjs_filter::error::ErrorFormatter;
//! use std::path::Path;
//!
//! if let Err(e) = ConfigLoader::load(Path::new(".")) {
//!     eprintln!("{}", ErrorFormatter::format(&e));
//!     std::process::exit(ErrorFormatter::exit_code(&e));
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::CONFIG_FILE_NAME;
use crate::filter::OptimizeError;

const OPTIMIZATION_DOCS: &str = "https://requirejs.org/docs/optimization.html";
const CONFIG_DOCS: &str = "https://requirejs.org/docs/api.html#config";

/// rjs-filter errors with contextual suggestions
#[derive(Error, Debug)]
pub enum RjsError {
    /// Interpreter or optimizer script could not be found
    #[error("Tool not found: {tool}")]
    ToolMissing {
        /// Tool name
        tool: String,
        /// Path or command that was looked up
        program: PathBuf,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Configuration file could not be parsed or failed validation
    #[error("Invalid configuration in {}: {reason}", path.display())]
    InvalidConfig {
        /// Path to config file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// File not found during operation
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to missing file
        path: PathBuf,
        /// Operation that required the file
        operation: String,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Optimizer run failed
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}

impl RjsError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjs_filter::error::RjsError;
    /// use std::path::PathBuf;
    ///
    /// let error = RjsError::ToolMissing {
    ///     tool: "interpreter".to_string(),
    ///     program: PathBuf::from("node"),
    /// };
    ///
    /// assert!(error.suggestion().unwrap().contains("interpreter"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ToolMissing { program, .. } => Some(format!(
                "Install it or point 'interpreter' / 'optimizer' in {} at it (looked for {})",
                CONFIG_FILE_NAME,
                program.display()
            )),
            Self::ConfigNotFound { .. } => {
                Some("Run 'rjs-filter init' to create a configuration file".to_string())
            }
            Self::InvalidConfig { .. } => Some(format!(
                "Fix {} and run 'rjs-filter check' to verify it",
                CONFIG_FILE_NAME
            )),
            Self::FileNotFound { path, operation } => Some(format!(
                "Ensure {} exists before running {}",
                path.display(),
                operation
            )),
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Optimize(e) => Some(optimize_suggestion(e)),
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::InvalidConfig { .. } => Some(CONFIG_DOCS),
            Self::ToolMissing { .. } | Self::Optimize(_) => Some(OPTIMIZATION_DOCS),
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Returns Unix-style exit codes based on the error type, following sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjs_filter::error::RjsError;
    /// use rjs_filter::filter::OptimizeError;
    /// use std::path::PathBuf;
    ///
    /// let error = RjsError::from(OptimizeError::InterpreterNotFound {
    ///     program: PathBuf::from("/usr/bin/node"),
    /// });
    /// assert_eq!(error.exit_code(), 127); // Command not found
    ///
    /// let error = RjsError::from(OptimizeError::OutputMissing {
    ///     path: PathBuf::from("/tmp/output1"),
    /// });
    /// assert_eq!(error.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolMissing { .. } => 127,    // Command not found (Unix convention)
            Self::ConfigNotFound { .. } => 66,  // EX_NOINPUT (sysexits.h)
            Self::InvalidConfig { .. } => 65,   // EX_DATAERR
            Self::FileNotFound { .. } => 66,    // EX_NOINPUT
            Self::Io { .. } => 74,              // EX_IOERR
            Self::Optimize(e) => optimize_exit_code(e),
        }
    }
}

fn optimize_exit_code(error: &OptimizeError) -> i32 {
    match error {
        OptimizeError::InterpreterNotFound { .. } => 127,
        OptimizeError::Io { .. } => 74,
        _ => 1,
    }
}

fn optimize_suggestion(error: &OptimizeError) -> String {
    match error {
        OptimizeError::InterpreterNotFound { program } => format!(
            "Install Node.js or set 'interpreter' in {} (tried {})",
            CONFIG_FILE_NAME,
            program.display()
        ),
        OptimizeError::OptimizerFailure { stderr, stdout, .. } => {
            let output = if stderr.trim().is_empty() { stdout } else { stderr };
            if output.trim().is_empty() {
                "Run 'rjs-filter profile <FILE>' to inspect the generated build profile"
                    .to_string()
            } else {
                format!("r.js output:\n{}", output.trim_end())
            }
        }
        OptimizeError::OutputMissing { .. } => {
            "Check that the optimizer can write to the temp directory".to_string()
        }
        OptimizeError::UnresolvedModule { .. } => {
            "Add a matching entry to [[options.modules]] or declare the alias in [paths]"
                .to_string()
        }
        OptimizeError::Io { context, .. } => format!(
            "Check file permissions and that {} is accessible",
            context
        ),
        OptimizeError::Serialize(_) => {
            "Check that every value under [options] is representable as JSON".to_string()
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(rjs_error) = Self::find(error) {
            if let Some(suggestion) = rjs_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = rjs_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        } else if let Some(optimize_error) = error.downcast_ref::<OptimizeError>() {
            output.push_str(&format!(
                "\n{} {}\n",
                style("help:").cyan().bold(),
                optimize_suggestion(optimize_error)
            ));
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        if let Some(rjs_error) = Self::find(error) {
            rjs_error.exit_code()
        } else if let Some(optimize_error) = error.downcast_ref::<OptimizeError>() {
            optimize_exit_code(optimize_error)
        } else {
            1 // Generic error
        }
    }

    fn find(error: &anyhow::Error) -> Option<&RjsError> {
        error.downcast_ref::<RjsError>()
    }
}
