//! # connectome-cli
//!
//! A command-line tool that orchestrates neuroimaging processing pipelines
//! by shelling out to pre-installed external toolchains (FSL, MRtrix).
//!
//! ## What lives here
//!
//! - **External-tool wrapper**: a uniform invocation contract — optional
//!   init-script sourcing into an isolated child environment, synchronous
//!   blocking execution, captured stdout/stderr, exit-code-to-error
//!   translation, and a lazily memoized version probe.
//! - **Pipeline glue**: path validation, fixed invocation sequences for
//!   reorientation, masking, b=0 extraction, registration and TBSS
//!   staging, and JSON run logs (inputs/outputs/runtime) per run.
//!
//! The scientific algorithms themselves (registration, skeletonization,
//! image formats) stay inside FSL and MRtrix; nothing here reimplements
//! them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use connectome_cli::wrapper::ToolWrapper;
//! use std::path::Path;
//!
//! # fn main() -> connectome_cli::Result<()> {
//! let wrapper = ToolWrapper::new(["fslreorient2std"], Some(Path::new("/etc/fsl/5.0/fsl.sh")))?
//!     .with_version_flag("-version");
//! wrapper.run(Path::new("/data"), ["t1.nii.gz", "t1_reoriented"])?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;
pub mod runlog;
pub mod tools;
pub mod wrapper;

// Re-export commonly used types and functions
pub use error::{PipelineError, Result};
pub use handlers::*;
pub use wrapper::{ToolOutput, ToolVersion, ToolWrapper};

use cli::Commands;
use config::types::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Reorient { input, output } => handlers::handle_reorient(input, output, config),
        Commands::Mask {
            input,
            mask,
            outroot,
        } => handlers::handle_mask(input, mask, outroot, config),
        Commands::Bzero {
            dwi,
            b0s,
            mean,
            nb_threads,
        } => handlers::handle_bzero(dwi, b0s, mean, nb_threads, config),
        Commands::Register {
            input,
            reference,
            outdir,
            dof,
            cost,
            non_linear,
        } => handlers::handle_register(input, reference, outdir, dof, cost, non_linear, config),
        Commands::Tbss {
            fa_maps,
            workdir,
            threshold,
        } => handlers::handle_tbss(fa_maps, workdir, threshold, config),
        Commands::Tools { command } => handlers::handle_tools(command, config),
    }
}
