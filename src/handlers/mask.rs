//! Apply a binary mask to an image via `fslmaths -mas`.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::json;

use crate::common::{absolutize, ensure_input_files, parent_or_cwd, resolve_output};
use crate::config::types::Config;
use crate::error::Result;
use crate::runlog::RunLogger;
use crate::tools::{ensure_fsl_version, fsl_wrapper};

pub fn handle_mask(
    input: PathBuf,
    mask: PathBuf,
    outroot: PathBuf,
    config: &Config,
) -> Result<()> {
    let input = absolutize(&input)?;
    let mask = absolutize(&mask)?;
    let outroot = absolutize(&outroot)?;
    ensure_input_files([input.as_path(), mask.as_path()])?;
    let fsl_version = ensure_fsl_version(config)?;

    let outdir = parent_or_cwd(&outroot)?;
    fs::create_dir_all(&outdir)?;

    // "-mas": keep voxels where the following image is > 0.
    let wrapper = fsl_wrapper("fslmaths", config)?;
    wrapper.run(
        &outdir,
        [
            input.display().to_string(),
            "-mas".to_string(),
            mask.display().to_string(),
            outroot.display().to_string(),
        ],
    )?;

    let produced = resolve_output(&format!("{}.*", outroot.display()))?;
    info!(
        "masked {} with {} -> {}",
        input.display(),
        mask.display(),
        produced.display()
    );

    let logger = RunLogger::new(&outdir, "mask")?;
    logger.write_inputs(&json!({ "input": input, "mask": mask, "outroot": outroot }))?;
    logger.write_outputs(&json!({ "masked": produced }))?;
    logger.write_runtime(Some(&fsl_version))?;

    println!("Masked image: {}", produced.display());
    Ok(())
}
