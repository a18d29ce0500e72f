//! Stage and run the fixed FSL TBSS sequence.
//!
//! TBSS insists on running inside its working directory: FA maps are
//! copied in, then the four stages run in order with the working
//! directory as cwd. Any stage exiting non-zero aborts the run; there is
//! no partial-failure recovery, matching the all-or-nothing character of
//! the statistics that come after.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::json;

use crate::common::{absolutize, ensure_directory, ensure_input_files};
use crate::config::types::Config;
use crate::error::{Result, ValidationError};
use crate::runlog::RunLogger;
use crate::tools::{ensure_fsl_version, fsl_wrapper};

pub fn handle_tbss(
    fa_maps: Vec<PathBuf>,
    workdir: PathBuf,
    threshold: f64,
    config: &Config,
) -> Result<()> {
    let fa_maps = fa_maps
        .iter()
        .map(|map| absolutize(map))
        .collect::<Result<Vec<_>>>()?;
    let workdir = absolutize(&workdir)?;
    ensure_input_files(fa_maps.iter().map(PathBuf::as_path))?;
    let fsl_version = ensure_fsl_version(config)?;
    if workdir.exists() {
        ensure_directory(&workdir)?;
    } else {
        fs::create_dir_all(&workdir)?;
    }

    // Stage the FA maps; tbss_1_preproc takes names relative to cwd.
    let mut staged_names = Vec::with_capacity(fa_maps.len());
    for map in &fa_maps {
        let name = map
            .file_name()
            .ok_or_else(|| ValidationError::NotAFile(map.clone()))?;
        fs::copy(map, workdir.join(name))?;
        staged_names.push(name.to_string_lossy().into_owned());
    }
    info!(
        "staged {} FA maps into {}",
        staged_names.len(),
        workdir.display()
    );

    fsl_wrapper("tbss_1_preproc", config)?.run(&workdir, staged_names)?;
    fsl_wrapper("tbss_2_reg", config)?.run(&workdir, ["-T"])?;
    fsl_wrapper("tbss_3_postreg", config)?.run(&workdir, ["-S"])?;
    fsl_wrapper("tbss_4_prestats", config)?.run(&workdir, [threshold.to_string()])?;
    info!("TBSS stages finished in {}", workdir.display());

    let stats_dir = workdir.join("stats");
    let logger = RunLogger::new(&workdir, "tbss")?;
    logger.write_inputs(&json!({
        "fa_maps": fa_maps,
        "workdir": workdir,
        "threshold": threshold,
    }))?;
    logger.write_outputs(&json!({
        "stats_dir": stats_dir,
        "skeletonised": stats_dir.join("all_FA_skeletonised.nii.gz"),
        "mean_fa_skeleton": stats_dir.join("mean_FA_skeleton.nii.gz"),
    }))?;
    logger.write_runtime(Some(&fsl_version))?;

    println!("TBSS outputs in: {}", stats_dir.display());
    Ok(())
}
