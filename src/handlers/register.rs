//! Register an image to a reference.
//!
//! Affine alignment via `flirt`, with an optional non-linear `fnirt`
//! refinement seeded by the affine matrix. The transforms themselves are
//! entirely FSL's business; this module only wires paths and arguments.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::json;

use crate::common::{absolutize, ensure_input_files, image_basename, resolve_output};
use crate::config::types::Config;
use crate::error::Result;
use crate::runlog::RunLogger;
use crate::tools::{ensure_fsl_version, fsl_wrapper};

pub fn handle_register(
    input: PathBuf,
    reference: PathBuf,
    outdir: PathBuf,
    dof: u32,
    cost: String,
    non_linear: bool,
    config: &Config,
) -> Result<()> {
    let input = absolutize(&input)?;
    let reference = absolutize(&reference)?;
    let outdir = absolutize(&outdir)?;
    ensure_input_files([input.as_path(), reference.as_path()])?;
    let fsl_version = ensure_fsl_version(config)?;
    fs::create_dir_all(&outdir)?;

    let basename = image_basename(&input);
    let affine = outdir.join(format!("{basename}_to_ref.mat"));
    let warped_root = outdir.join(format!("{basename}_affine"));

    let flirt = fsl_wrapper("flirt", config)?;
    flirt.run(
        &outdir,
        [
            "-in".to_string(),
            input.display().to_string(),
            "-ref".to_string(),
            reference.display().to_string(),
            "-omat".to_string(),
            affine.display().to_string(),
            "-out".to_string(),
            warped_root.display().to_string(),
            "-dof".to_string(),
            dof.to_string(),
            "-cost".to_string(),
            cost.clone(),
        ],
    )?;

    let warped = resolve_output(&format!("{}*", warped_root.display()))?;
    info!(
        "affine registration {} -> {} done",
        input.display(),
        reference.display()
    );

    let mut outputs = json!({ "affine_matrix": affine, "warped_affine": warped });

    if non_linear {
        let warped_nl_root = outdir.join(format!("{basename}_nonlinear"));
        let field_root = outdir.join(format!("{basename}_warp_field"));

        let fnirt = fsl_wrapper("fnirt", config)?;
        fnirt.run(
            &outdir,
            [
                format!("--in={}", input.display()),
                format!("--ref={}", reference.display()),
                format!("--aff={}", affine.display()),
                format!("--iout={}", warped_nl_root.display()),
                format!("--fout={}", field_root.display()),
            ],
        )?;

        let warped_nl = resolve_output(&format!("{}*", warped_nl_root.display()))?;
        let field = resolve_output(&format!("{}*", field_root.display()))?;
        info!("non-linear refinement done: {}", warped_nl.display());

        outputs["warped_nonlinear"] = json!(warped_nl);
        outputs["warp_field"] = json!(field);
    }

    let logger = RunLogger::new(&outdir, "register")?;
    logger.write_inputs(&json!({
        "input": input,
        "reference": reference,
        "dof": dof,
        "cost": cost,
        "non_linear": non_linear,
    }))?;
    logger.write_outputs(&outputs)?;
    logger.write_runtime(Some(&fsl_version))?;

    println!("Registration outputs in: {}", outdir.display());
    Ok(())
}
