//! Registry of the external tools the pipelines shell out to.
//!
//! FSL binaries need their init script sourced and answer `-version`;
//! MRtrix binaries run from the plain environment and answer `--version`.
//! The registry drives both the `tools status` report and the per-pipeline
//! minimum-version gate.

pub mod status;

use std::path::Path;

use log::debug;

use crate::config::types::Config;
use crate::error::Result;
use crate::wrapper::{ToolVersion, ToolWrapper};

pub use status::{ToolStatus, ToolStatusReport, ToolStatusReporter};

/// Toolchain a binary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    Fsl,
    Mrtrix,
}

/// Static description of one required external binary
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub toolchain: Toolchain,
    pub version_flag: &'static str,
    /// Minimum toolchain version, checked where the tool reports one
    pub minimum: Option<&'static str>,
}

/// Binary probed to establish the FSL toolchain version
pub const FSL_VERSION_PROBE: &str = "flirt";

/// Everything the pipeline subcommands may invoke
pub const REQUIRED_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "flirt",
        toolchain: Toolchain::Fsl,
        version_flag: "-version",
        minimum: Some("5.0.9"),
    },
    ToolSpec {
        name: "fnirt",
        toolchain: Toolchain::Fsl,
        version_flag: "-version",
        minimum: None,
    },
    ToolSpec {
        name: "fslmaths",
        toolchain: Toolchain::Fsl,
        version_flag: "-version",
        minimum: None,
    },
    ToolSpec {
        name: "fslreorient2std",
        toolchain: Toolchain::Fsl,
        version_flag: "-version",
        minimum: None,
    },
    ToolSpec {
        name: "tbss_1_preproc",
        toolchain: Toolchain::Fsl,
        version_flag: "-version",
        minimum: None,
    },
    ToolSpec {
        name: "dwiextract",
        toolchain: Toolchain::Mrtrix,
        version_flag: "--version",
        minimum: None,
    },
    ToolSpec {
        name: "mrmath",
        toolchain: Toolchain::Mrtrix,
        version_flag: "--version",
        minimum: None,
    },
];

/// Build a wrapper for an FSL binary, sourcing the configured init script
pub fn fsl_wrapper(program: &str, config: &Config) -> Result<ToolWrapper> {
    Ok(
        ToolWrapper::new([program], Some(config.fsl.init_script.as_path()))?
            .with_version_flag("-version"),
    )
}

/// Build a wrapper for an MRtrix binary; MRtrix needs no init script
pub fn mrtrix_wrapper(program: &str, config: &Config) -> Result<ToolWrapper> {
    ToolWrapper::new([resolved_program(program, Toolchain::Mrtrix, config)], None)
}

/// Program token for a registry binary. MRtrix installs often live
/// outside PATH, in which case the configured bin directory is prefixed;
/// FSL binaries are found through the sourced init script.
pub(crate) fn resolved_program(name: &str, toolchain: Toolchain, config: &Config) -> String {
    match (toolchain, &config.mrtrix.bin_dir) {
        (Toolchain::Mrtrix, Some(bin_dir)) => bin_dir.join(name).display().to_string(),
        _ => name.to_string(),
    }
}

/// Probe the FSL toolchain version and enforce the configured minimum.
///
/// Called once at the start of every FSL pipeline; an unsatisfied minimum
/// aborts the whole run.
pub fn ensure_fsl_version(config: &Config) -> Result<ToolVersion> {
    let minimum = config.fsl_min_version()?;
    let probe = fsl_wrapper(FSL_VERSION_PROBE, config)?;
    let found = probe.ensure_version_at_least(&minimum)?.clone();
    debug!("FSL version {found} satisfies minimum {minimum}");
    Ok(found)
}

/// Init script path for a toolchain, when it requires one
pub fn init_script_for<'a>(toolchain: Toolchain, config: &'a Config) -> Option<&'a Path> {
    match toolchain {
        Toolchain::Fsl => Some(config.fsl.init_script.as_path()),
        Toolchain::Mrtrix => None,
    }
}
