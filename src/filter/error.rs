//! Error types for the optimizer filter

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while optimizing an asset
#[derive(Error, Debug)]
pub enum OptimizeError {
    /// The interpreter (or the optimizer itself, when run directly) could not be resolved
    #[error("Path to optimizer interpreter could not be resolved: {}", program.display())]
    InterpreterNotFound {
        /// Program that was spawned
        program: PathBuf,
    },

    /// The optimizer exited with a non-zero status
    #[error("Optimizer failed ({}): {}", describe_exit(*exit_code), first_line(stderr, stdout))]
    OptimizerFailure {
        /// Exit code, `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
        /// The asset content that was handed to the optimizer
        input: String,
    },

    /// The optimizer reported success but left no output file behind
    #[error("Error creating output file: {}", path.display())]
    OutputMissing {
        /// Expected output file
        path: PathBuf,
    },

    /// Multi-output mode is active but the asset belongs to no declared module
    #[error("No module in 'modules' matches asset {}", describe_location(source_location.as_ref()))]
    UnresolvedModule {
        /// Resolved source location of the asset, if it has one
        source_location: Option<PathBuf>,
    },

    /// I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// What was being done when the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// The build profile could not be serialized
    #[error("Failed to serialize build profile: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OptimizeError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn first_line<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let text = if stderr.trim().is_empty() { stdout } else { stderr };
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
}

fn describe_location(location: Option<&PathBuf>) -> String {
    location
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<no source location>".to_string())
}
