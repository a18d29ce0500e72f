//! Child-environment resolution for sourced init scripts.
//!
//! Toolchains like FSL ship a setup script that exports the variables their
//! binaries need (`FSLDIR`, `FSLOUTPUTTYPE`, `PATH` additions). We source
//! that script in a throwaway POSIX shell and capture the resulting
//! environment, so the calling process is never mutated and two wrappers
//! with different init scripts can coexist.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{ConfigurationError, Result};

/// Variable name to value mapping passed verbatim to child processes
pub type Environment = HashMap<String, String>;

/// Snapshot of the calling process environment
pub fn current_environment() -> Environment {
    std::env::vars().collect()
}

/// Source `script` in a fresh `sh` and return the current environment
/// merged with the variables the script exported.
///
/// Fails with [`ConfigurationError::InitScriptMissing`] before spawning
/// anything when the script does not exist.
pub fn source_environment(script: &Path) -> Result<Environment> {
    if !script.is_file() {
        return Err(ConfigurationError::InitScriptMissing {
            path: script.to_path_buf(),
        }
        .into());
    }

    debug!("sourcing init script {}", script.display());

    // The script path travels as $0 so no shell quoting is needed. The
    // script's own stdout is discarded so only `env` output gets parsed;
    // its stderr is kept for diagnostics.
    let output = Command::new("sh")
        .arg("-c")
        .arg(". \"$0\" >/dev/null && env")
        .arg(script)
        .output()
        .map_err(|e| ConfigurationError::InitScriptFailed {
            path: script.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ConfigurationError::InitScriptFailed {
            path: script.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let mut environment = current_environment();
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        // Continuation lines of multi-line values carry no '=' and are
        // skipped; toolchain setup scripts do not export such values.
        if let Some((name, value)) = line.split_once('=') {
            environment.insert(name.to_string(), value.to_string());
        }
    }

    debug!(
        "resolved {} environment variables from {}",
        environment.len(),
        script.display()
    );
    Ok(environment)
}
