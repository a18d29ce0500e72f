//! Relative caller paths must work even though the pipelines run their
//! children in the output directory.
//!
//! This binary holds a single test because it changes the process
//! working directory, which would race with parallel tests.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use connectome_cli::cli::Commands;
use connectome_cli::config::types::Config;
use connectome_cli::run_command;

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("chmod");
}

fn fake_fsl(root: &Path) -> PathBuf {
    let bin = root.join("bin");
    fs::create_dir_all(&bin).expect("bin dir");

    write_script(
        &bin,
        "flirt",
        "[ \"$1\" = \"-version\" ] && echo \"FLIRT version 6.0.4\"\nexit 0\n",
    );
    write_script(&bin, "fslreorient2std", "cp \"$1\" \"$2.nii.gz\"\nexit 0\n");
    write_script(&bin, "fslmaths", ": > \"$4.nii.gz\"\nexit 0\n");

    let init = root.join("fsl.sh");
    fs::write(
        &init,
        format!("export PATH=\"{}:$PATH\"\n", bin.display()),
    )
    .expect("write init script");
    init
}

#[test]
fn relative_paths_resolve_against_the_caller_cwd() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = Config::default();
    config.fsl.init_script = fake_fsl(dir.path());

    std::env::set_current_dir(dir.path()).expect("chdir");
    fs::write("t1.nii.gz", b"image").expect("write input");

    run_command(
        Commands::Reorient {
            input: PathBuf::from("t1.nii.gz"),
            output: PathBuf::from("out/t1_reo"),
        },
        &config,
    )
    .expect("reorient succeeds");

    assert!(Path::new("out/t1_reo.nii.gz").is_file());
    assert!(
        !Path::new("out/out").exists(),
        "output must not resolve against the child's cwd"
    );
    assert!(Path::new("out/logs/runtime.json").is_file());

    run_command(
        Commands::Mask {
            input: PathBuf::from("t1.nii.gz"),
            mask: PathBuf::from("t1.nii.gz"),
            outroot: PathBuf::from("out/t1_masked"),
        },
        &config,
    )
    .expect("mask succeeds");

    assert!(Path::new("out/t1_masked.nii.gz").is_file());
}
