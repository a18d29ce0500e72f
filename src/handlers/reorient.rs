//! Reorient an image to the approximate MNI152 orientation.
//!
//! Thin glue over `fslreorient2std`, which only applies 0/90/180/270
//! degree rotations and is not a registration tool.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::json;

use crate::common::{absolutize, ensure_input_files, parent_or_cwd, resolve_output};
use crate::config::types::Config;
use crate::error::Result;
use crate::runlog::RunLogger;
use crate::tools::{ensure_fsl_version, fsl_wrapper};

pub fn handle_reorient(input: PathBuf, output: PathBuf, config: &Config) -> Result<()> {
    // The child runs inside the output directory; caller-relative paths
    // must be pinned before they enter the argument list.
    let input = absolutize(&input)?;
    let output = absolutize(&output)?;
    ensure_input_files([input.as_path()])?;
    let fsl_version = ensure_fsl_version(config)?;

    let outdir = parent_or_cwd(&output)?;
    fs::create_dir_all(&outdir)?;

    let wrapper = fsl_wrapper("fslreorient2std", config)?;
    wrapper.run(
        &outdir,
        [input.display().to_string(), output.display().to_string()],
    )?;

    // FSL appends its compression suffix to the output root.
    let produced = resolve_output(&format!("{}*", output.display()))?;
    info!("reoriented {} -> {}", input.display(), produced.display());

    let logger = RunLogger::new(&outdir, "reorient")?;
    logger.write_inputs(&json!({ "input": input, "output": output }))?;
    logger.write_outputs(&json!({ "reoriented": produced }))?;
    logger.write_runtime(Some(&fsl_version))?;

    println!("Reoriented image: {}", produced.display());
    Ok(())
}
