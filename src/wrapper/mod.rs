//! Uniform invocation contract for pre-installed external toolchains.
//!
//! Every pipeline step shells out through a [`ToolWrapper`]: construction
//! resolves the child environment once (optionally by sourcing a toolchain
//! init script), each [`ToolWrapper::run`] is a single synchronous blocking
//! call, and the tool version is probed lazily and memoized for the
//! wrapper's lifetime.
//!
//! The wrapper knows nothing about the files its child writes; output
//! validation belongs to the calling pipeline.

pub mod environment;
pub mod version;

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use once_cell::sync::OnceCell;

use crate::error::{ConfigurationError, Result, ToolExecutionError};

pub use environment::Environment;
pub use version::ToolVersion;

/// Captured output of one external invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code of the child, 0 on success
    pub code: i32,
}

/// Wrapper around one external command line.
///
/// Holds the base command tokens, the resolved child environment and the
/// memoized tool version. Instances are cheap to keep around for the
/// duration of a pipeline and safe to hold next to wrappers configured
/// with a different init script.
pub struct ToolWrapper {
    tokens: Vec<String>,
    init_script: Option<PathBuf>,
    environment: Environment,
    version_flag: String,
    version: OnceCell<ToolVersion>,
}

impl ToolWrapper {
    /// Build a wrapper for `tokens`, sourcing `init_script` into the child
    /// environment when one is given.
    ///
    /// Fails with a configuration error before spawning anything when the
    /// token list is empty or the init script does not exist.
    pub fn new<I, S>(tokens: I, init_script: Option<&Path>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(ConfigurationError::EmptyCommand.into());
        }

        let environment = match init_script {
            Some(script) => environment::source_environment(script)?,
            None => environment::current_environment(),
        };

        Ok(Self {
            tokens,
            init_script: init_script.map(Path::to_path_buf),
            environment,
            version_flag: "--version".to_string(),
            version: OnceCell::new(),
        })
    }

    /// Override the version-query flag (FSL binaries use `-version`)
    pub fn with_version_flag(mut self, flag: &str) -> Self {
        self.version_flag = flag.to_string();
        self
    }

    /// Program name, the first command token
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Init script this wrapper was configured with, if any
    pub fn init_script(&self) -> Option<&Path> {
        self.init_script.as_deref()
    }

    /// Resolved child environment, computed once at construction
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Run the wrapped command once, blocking until it exits.
    ///
    /// `extra_args` are appended to the base tokens, the child runs in
    /// `cwd` with the resolved environment. Exit status 0 is the sole
    /// success signal; any other exit raises a
    /// [`ToolExecutionError::NonZeroExit`] carrying the code and captured
    /// stderr. No retries, no timeout.
    pub fn run<I, S>(&self, cwd: &Path, extra_args: I) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extra: Vec<String> = extra_args.into_iter().map(Into::into).collect();
        debug!(
            "running {} {} (cwd: {})",
            self.tokens.join(" "),
            extra.join(" "),
            cwd.display()
        );

        let output = Command::new(&self.tokens[0])
            .args(&self.tokens[1..])
            .args(&extra)
            .current_dir(cwd)
            .env_clear()
            .envs(&self.environment)
            .output()
            .map_err(|e| ToolExecutionError::SpawnFailed {
                tool: self.tokens[0].clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(match output.status.code() {
                Some(code) => ToolExecutionError::NonZeroExit {
                    tool: self.tokens[0].clone(),
                    code,
                    stderr: stderr.trim().to_string(),
                },
                None => ToolExecutionError::Terminated {
                    tool: self.tokens[0].clone(),
                },
            }
            .into());
        }

        Ok(ToolOutput {
            stdout,
            stderr,
            code: 0,
        })
    }

    /// Probed tool version, memoized for the wrapper's lifetime.
    ///
    /// The first read runs `<program> <version_flag>` once and parses the
    /// first line of its output; later reads return the cached value
    /// without spawning anything. A failed probe is an error and is not
    /// cached.
    pub fn version(&self) -> Result<&ToolVersion> {
        self.version.get_or_try_init(|| {
            let output = Command::new(&self.tokens[0])
                .arg(&self.version_flag)
                .env_clear()
                .envs(&self.environment)
                .output()
                .map_err(|e| ToolExecutionError::SpawnFailed {
                    tool: self.tokens[0].clone(),
                    source: e,
                })?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

            if !output.status.success() {
                return Err(match output.status.code() {
                    Some(code) => ToolExecutionError::NonZeroExit {
                        tool: self.tokens[0].clone(),
                        code,
                        stderr: stderr.trim().to_string(),
                    },
                    None => ToolExecutionError::Terminated {
                        tool: self.tokens[0].clone(),
                    },
                }
                .into());
            }

            // A few tools print their banner to stderr even on success.
            let parsed = ToolVersion::from_probe_output(&stdout)
                .or_else(|| ToolVersion::from_probe_output(&stderr));
            parsed.ok_or_else(|| {
                ToolExecutionError::VersionUnparsable {
                    tool: self.tokens[0].clone(),
                    output: stdout.lines().next().unwrap_or_default().to_string(),
                }
                .into()
            })
        })
    }

    /// Hard minimum-version gate: probe (or reuse the cached) version and
    /// fail when it sorts below `minimum`.
    pub fn ensure_version_at_least(&self, minimum: &ToolVersion) -> Result<&ToolVersion> {
        let found = self.version()?;
        if found < minimum {
            return Err(ToolExecutionError::VersionTooOld {
                tool: self.tokens[0].clone(),
                found: found.clone(),
                required: minimum.clone(),
            }
            .into());
        }
        Ok(found)
    }
}

impl std::fmt::Debug for ToolWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolWrapper")
            .field("tokens", &self.tokens)
            .field("init_script", &self.init_script)
            .field("version", &self.version.get())
            .finish_non_exhaustive()
    }
}
