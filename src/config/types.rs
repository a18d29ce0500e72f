use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::wrapper::ToolVersion;

/// Default FSL setup script location on a standard install
pub const DEFAULT_FSL_INIT_SCRIPT: &str = "/etc/fsl/5.0/fsl.sh";

/// Default minimum FSL version the pipelines require
pub const DEFAULT_FSL_MIN_VERSION: &str = "5.0.9";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fsl: FslConfig,
    pub mrtrix: MrtrixConfig,
}

/// FSL toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FslConfig {
    /// Setup script sourced into every FSL child environment
    pub init_script: PathBuf,
    /// Minimum toolchain version; older installs abort the pipeline
    pub min_version: String,
}

impl Default for FslConfig {
    fn default() -> Self {
        Self {
            init_script: PathBuf::from(DEFAULT_FSL_INIT_SCRIPT),
            min_version: DEFAULT_FSL_MIN_VERSION.to_string(),
        }
    }
}

/// MRtrix toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MrtrixConfig {
    /// Directory holding the MRtrix binaries; bare names resolve via PATH
    pub bin_dir: Option<PathBuf>,
    /// Thread count passed through `-nthreads`
    pub nb_threads: u32,
}

impl Default for MrtrixConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            nb_threads: 1,
        }
    }
}

impl Config {
    /// Parsed minimum FSL version
    pub fn fsl_min_version(&self) -> Result<ToolVersion> {
        ToolVersion::parse(&self.fsl.min_version).ok_or_else(|| {
            ConfigurationError::ParsingFailed(format!(
                "fsl.min_version '{}' is not a dotted-numeric version",
                self.fsl.min_version
            ))
            .into()
        })
    }
}
