//! Error types for the pipeline CLI.
//!
//! Every fallible path in the crate funnels into [`PipelineError`]. The
//! nested enums keep the failure domains separate: configuration problems
//! are detected before any external process is spawned, execution problems
//! carry the exit code and captured stderr of the failed tool.

use std::path::PathBuf;

use thiserror::Error;

use crate::wrapper::ToolVersion;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Top-level error type for all pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration is invalid; nothing was executed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// An external tool was executed and failed
    #[error("Tool execution error: {0}")]
    Execution(#[from] ToolExecutionError),

    /// Input validation failed before any tool was invoked
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Filesystem-level failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Run log serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while resolving wrapper or file configuration.
///
/// All of these fire at construction time, before a child process exists.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("environment init script not found: {}", path.display())]
    InitScriptMissing { path: PathBuf },

    #[error("failed to source init script {}: {reason}", path.display())]
    InitScriptFailed { path: PathBuf, reason: String },

    #[error("a tool command line needs at least a program name")]
    EmptyCommand,

    #[error("failed to parse configuration: {0}")]
    ParsingFailed(String),
}

/// Errors raised by a single external-tool invocation
#[derive(Error, Debug)]
pub enum ToolExecutionError {
    #[error("'{tool}' exited with code {code}: {stderr}")]
    NonZeroExit {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("'{tool}' was terminated by a signal")]
    Terminated { tool: String },

    #[error("failed to spawn '{tool}': {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse a version from '{tool}' output: {output:?}")]
    VersionUnparsable { tool: String, output: String },

    #[error("'{tool}' version {found} is older than the required minimum {required}")]
    VersionTooOld {
        tool: String,
        found: ToolVersion,
        required: ToolVersion,
    },
}

/// Errors raised by path checks surrounding an invocation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("'{}' is not a valid input file", .0.display())]
    NotAFile(PathBuf),

    #[error("'{}' is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("no file produced matching '{0}'")]
    MissingOutput(String),

    #[error("invalid glob pattern '{0}': {1}")]
    Pattern(String, String),
}
