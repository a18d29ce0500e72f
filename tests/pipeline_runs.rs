//! End-to-end pipeline tests against a fake FSL install.
//!
//! A temp directory stands in for an FSL tree: an init script that
//! prepends a bin/ of fake shell binaries to PATH, and a flirt that
//! answers `-version`. The pipelines run through `run_command` exactly as
//! the binary would drive them.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use connectome_cli::cli::Commands;
use connectome_cli::config::types::Config;
use connectome_cli::error::{PipelineError, ToolExecutionError, ValidationError};
use connectome_cli::run_command;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("chmod");
    path
}

/// Lay down a fake FSL install and return its init script path.
fn fake_fsl(root: &Path, flirt_version: &str) -> PathBuf {
    let bin = root.join("bin");
    fs::create_dir_all(&bin).expect("bin dir");

    write_script(
        &bin,
        "flirt",
        &format!(
            r#"if [ "$1" = "-version" ]; then
  echo "FLIRT version {flirt_version}"
  exit 0
fi
out=""; omat=""
while [ $# -gt 0 ]; do
  case "$1" in
    -out) out="$2"; shift 2;;
    -omat) omat="$2"; shift 2;;
    *) shift;;
  esac
done
[ -n "$omat" ] && : > "$omat"
[ -n "$out" ] && : > "$out.nii.gz"
exit 0
"#
        ),
    );

    write_script(&bin, "fslreorient2std", "cp \"$1\" \"$2.nii.gz\"\nexit 0\n");
    write_script(&bin, "fslmaths", ": > \"$4.nii.gz\"\nexit 0\n");
    write_script(
        &bin,
        "fnirt",
        r#"for arg in "$@"; do
  case "$arg" in
    --iout=*) : > "${arg#--iout=}.nii.gz";;
    --fout=*) : > "${arg#--fout=}.nii.gz";;
  esac
done
exit 0
"#,
    );
    for stage in [
        "tbss_1_preproc",
        "tbss_2_reg",
        "tbss_3_postreg",
        "tbss_4_prestats",
    ] {
        write_script(
            &bin,
            stage,
            &format!("echo \"{stage} $*\" >> order.log\nexit 0\n"),
        );
    }

    let init = root.join("fsl.sh");
    fs::write(
        &init,
        format!(
            "export FSLDIR=\"{}\"\nexport PATH=\"{}:$PATH\"\n",
            root.display(),
            bin.display()
        ),
    )
    .expect("write init script");
    init
}

/// Lay down fake MRtrix binaries and return their bin directory.
///
/// Both tools log their invocation to `order.log` in the cwd and create
/// the file their third argument names.
fn fake_mrtrix(root: &Path) -> PathBuf {
    let bin = root.join("mrtrix").join("bin");
    fs::create_dir_all(&bin).expect("bin dir");

    for tool in ["dwiextract", "mrmath"] {
        write_script(
            &bin,
            tool,
            &format!(
                r#"if [ "$1" = "--version" ]; then
  echo "== {tool} 3.0.4 =="
  exit 0
fi
echo "{tool} $*" >> order.log
: > "$3"
exit 0
"#
            ),
        );
    }
    bin
}

fn test_config(init: &Path) -> Config {
    let mut config = Config::default();
    config.fsl.init_script = init.to_path_buf();
    config
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read json")).expect("valid json")
}

#[test]
fn reorient_produces_the_output_and_run_logs() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let input = dir.path().join("t1.nii.gz");
    fs::write(&input, b"image").expect("write input");
    let output = dir.path().join("out").join("t1_reoriented");

    run_command(
        Commands::Reorient {
            input: input.clone(),
            output: output.clone(),
        },
        &config,
    )
    .expect("pipeline succeeds");

    let outdir = dir.path().join("out");
    assert!(outdir.join("t1_reoriented.nii.gz").is_file());

    let logs = outdir.join("logs");
    let runtime = read_json(&logs.join("runtime.json"));
    assert_eq!(runtime["tool"], "reorient");
    assert_eq!(runtime["tool_version"], "6.0.4");
    let inputs = read_json(&logs.join("inputs.json"));
    assert_eq!(inputs["input"], input.display().to_string());
    let outputs = read_json(&logs.join("outputs.json"));
    assert!(
        outputs["reoriented"]
            .as_str()
            .expect("reoriented path")
            .ends_with("t1_reoriented.nii.gz")
    );
}

#[test]
fn reorient_rejects_a_missing_input_before_spawning_anything() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let err = run_command(
        Commands::Reorient {
            input: dir.path().join("absent.nii.gz"),
            output: dir.path().join("out").join("t1_reoriented"),
        },
        &config,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::NotAFile(_))
    ));
    assert!(!dir.path().join("out").exists(), "nothing may be created");
}

#[test]
fn pipeline_aborts_when_fsl_is_older_than_the_minimum() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "5.0.8");
    let config = test_config(&init); // default minimum 5.0.9

    let input = dir.path().join("t1.nii.gz");
    fs::write(&input, b"image").expect("write input");

    let err = run_command(
        Commands::Reorient {
            input,
            output: dir.path().join("t1_reoriented"),
        },
        &config,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Execution(ToolExecutionError::VersionTooOld { .. })
    ));
}

#[test]
fn mask_failure_carries_the_stage_exit_code() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    // Make fslmaths fail like a real tool would on a bad mask.
    write_script(
        &dir.path().join("bin"),
        "fslmaths",
        "echo 'Image dimensions do not match' >&2\nexit 3\n",
    );
    let config = test_config(&init);

    let input = dir.path().join("dwi.nii.gz");
    let mask = dir.path().join("mask.nii.gz");
    fs::write(&input, b"image").expect("write input");
    fs::write(&mask, b"mask").expect("write mask");

    let err = run_command(
        Commands::Mask {
            input,
            mask,
            outroot: dir.path().join("dwi_masked"),
        },
        &config,
    )
    .unwrap_err();

    match err {
        PipelineError::Execution(ToolExecutionError::NonZeroExit { code, stderr, .. }) => {
            assert_eq!(code, 3);
            assert!(stderr.contains("dimensions do not match"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn register_with_nonlinear_refinement_logs_all_transforms() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let input = dir.path().join("fa.nii.gz");
    let reference = dir.path().join("template.nii.gz");
    fs::write(&input, b"image").expect("write input");
    fs::write(&reference, b"template").expect("write reference");
    let outdir = dir.path().join("reg");

    run_command(
        Commands::Register {
            input,
            reference,
            outdir: outdir.clone(),
            dof: 12,
            cost: "corratio".to_string(),
            non_linear: true,
        },
        &config,
    )
    .expect("pipeline succeeds");

    assert!(outdir.join("fa_to_ref.mat").is_file());
    assert!(outdir.join("fa_affine.nii.gz").is_file());
    assert!(outdir.join("fa_nonlinear.nii.gz").is_file());
    assert!(outdir.join("fa_warp_field.nii.gz").is_file());

    let outputs = read_json(&outdir.join("logs").join("outputs.json"));
    for key in [
        "affine_matrix",
        "warped_affine",
        "warped_nonlinear",
        "warp_field",
    ] {
        assert!(outputs[key].is_string(), "{key} missing from outputs.json");
    }
}

#[test]
fn tbss_stages_run_in_order_inside_the_workdir() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let fa_a = dir.path().join("sub01_FA.nii.gz");
    let fa_b = dir.path().join("sub02_FA.nii.gz");
    fs::write(&fa_a, b"a").expect("write fa");
    fs::write(&fa_b, b"b").expect("write fa");
    let workdir = dir.path().join("tbss");

    run_command(
        Commands::Tbss {
            fa_maps: vec![fa_a, fa_b],
            workdir: workdir.clone(),
            threshold: 0.2,
        },
        &config,
    )
    .expect("pipeline succeeds");

    // FA maps staged into the working directory.
    assert!(workdir.join("sub01_FA.nii.gz").is_file());
    assert!(workdir.join("sub02_FA.nii.gz").is_file());

    let order = fs::read_to_string(workdir.join("order.log")).expect("order log");
    let stages: Vec<&str> = order.lines().collect();
    assert_eq!(stages.len(), 4);
    assert!(stages[0].starts_with("tbss_1_preproc sub0"));
    assert_eq!(stages[1], "tbss_2_reg -T");
    assert_eq!(stages[2], "tbss_3_postreg -S");
    assert_eq!(stages[3], "tbss_4_prestats 0.2");

    let runtime = read_json(&workdir.join("logs").join("runtime.json"));
    assert_eq!(runtime["tool"], "tbss");
}

#[test]
fn tbss_rejects_a_workdir_that_is_a_plain_file() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let fa = dir.path().join("sub01_FA.nii.gz");
    fs::write(&fa, b"a").expect("write fa");
    let workdir = dir.path().join("tbss");
    fs::write(&workdir, b"not a directory").expect("write file");

    let err = run_command(
        Commands::Tbss {
            fa_maps: vec![fa],
            workdir,
            threshold: 0.2,
        },
        &config,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::NotADirectory(_))
    ));
}

#[test]
fn bzero_runs_extract_then_mean_and_writes_run_logs() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = Config::default();
    config.mrtrix.bin_dir = Some(fake_mrtrix(dir.path()));
    config.mrtrix.nb_threads = 2;

    let dwi = dir.path().join("dwi.mif");
    fs::write(&dwi, b"dwi").expect("write dwi");
    let b0s = dir.path().join("b0s.mif");
    let mean = dir.path().join("mean_b0.mif");

    run_command(
        Commands::Bzero {
            dwi: dwi.clone(),
            b0s: b0s.clone(),
            mean: mean.clone(),
            nb_threads: None,
        },
        &config,
    )
    .expect("pipeline succeeds");

    assert!(b0s.is_file());
    assert!(mean.is_file());

    // Extraction must precede the averaging, with the exact MRtrix
    // argument shape for each step.
    let order = fs::read_to_string(dir.path().join("order.log")).expect("order log");
    let calls: Vec<&str> = order.lines().collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        format!(
            "dwiextract -bzero {} {} -nthreads 2 -failonwarn",
            dwi.display(),
            b0s.display()
        )
    );
    assert_eq!(
        calls[1],
        format!(
            "mrmath {} mean {} -axis 3 -nthreads 2 -failonwarn",
            b0s.display(),
            mean.display()
        )
    );

    let logs = dir.path().join("logs");
    let runtime = read_json(&logs.join("runtime.json"));
    assert_eq!(runtime["tool"], "bzero");
    assert_eq!(runtime["tool_version"], "3.0.4");
    let outputs = read_json(&logs.join("outputs.json"));
    assert_eq!(outputs["mean_b0"], mean.display().to_string());
}

#[test]
fn bzero_rejects_a_missing_dwi_before_spawning_anything() {
    let config = Config::default();
    let dir = TempDir::new().expect("tempdir");

    let err = run_command(
        Commands::Bzero {
            dwi: dir.path().join("absent_dwi.nii.gz"),
            b0s: dir.path().join("b0s.nii.gz"),
            mean: dir.path().join("mean_b0.nii.gz"),
            nb_threads: None,
        },
        &config,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::NotAFile(_))
    ));
}

#[test]
fn tools_status_sees_the_fake_fsl_install() {
    let dir = TempDir::new().expect("tempdir");
    let init = fake_fsl(dir.path(), "6.0.4");
    let config = test_config(&init);

    let report =
        connectome_cli::tools::ToolStatusReporter::new(&config).generate_report();
    let flirt = report
        .tools
        .iter()
        .find(|tool| tool.name == "flirt")
        .expect("flirt in registry");

    assert!(flirt.available);
    assert_eq!(flirt.version.as_deref(), Some("6.0.4"));
    assert_eq!(flirt.satisfies_minimum, Some(true));
}
