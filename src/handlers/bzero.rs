//! Extract b=0 volumes from a DWI series and average them.
//!
//! MRtrix two-step: `dwiextract -bzero` pulls the b=0 volumes, `mrmath
//! mean` collapses them along the fourth axis. MRtrix needs no init
//! script; the wrappers run with the plain process environment.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::json;

use crate::common::{absolutize, ensure_input_files, parent_or_cwd};
use crate::config::types::Config;
use crate::error::Result;
use crate::runlog::RunLogger;
use crate::tools::mrtrix_wrapper;

pub fn handle_bzero(
    dwi: PathBuf,
    b0s: PathBuf,
    mean: PathBuf,
    nb_threads: Option<u32>,
    config: &Config,
) -> Result<()> {
    let dwi = absolutize(&dwi)?;
    let b0s = absolutize(&b0s)?;
    let mean = absolutize(&mean)?;
    ensure_input_files([dwi.as_path()])?;
    let threads = nb_threads.unwrap_or(config.mrtrix.nb_threads).to_string();

    let outdir = parent_or_cwd(&mean)?;
    fs::create_dir_all(&outdir)?;

    let dwiextract = mrtrix_wrapper("dwiextract", config)?;
    dwiextract.run(
        &outdir,
        [
            "-bzero".to_string(),
            dwi.display().to_string(),
            b0s.display().to_string(),
            "-nthreads".to_string(),
            threads.clone(),
            "-failonwarn".to_string(),
        ],
    )?;

    let mrmath = mrtrix_wrapper("mrmath", config)?;
    mrmath.run(
        &outdir,
        [
            b0s.display().to_string(),
            "mean".to_string(),
            mean.display().to_string(),
            "-axis".to_string(),
            "3".to_string(),
            "-nthreads".to_string(),
            threads,
            "-failonwarn".to_string(),
        ],
    )?;

    info!(
        "extracted b=0 volumes from {} -> {}",
        dwi.display(),
        mean.display()
    );

    let mrtrix_version = dwiextract.version().ok().cloned();
    let logger = RunLogger::new(&outdir, "bzero")?;
    logger.write_inputs(&json!({
        "dwi": dwi,
        "nb_threads": nb_threads.unwrap_or(config.mrtrix.nb_threads),
    }))?;
    logger.write_outputs(&json!({ "b0s": b0s, "mean_b0": mean }))?;
    logger.write_runtime(mrtrix_version.as_ref())?;

    println!("Mean b=0 volume: {}", mean.display());
    Ok(())
}
