//! Path checks shared by the pipeline handlers.

use std::path::{Path, PathBuf};

use glob::glob;

use crate::error::{Result, ValidationError};

/// Check that every given path is an existing file.
///
/// Pipelines call this before spawning anything, so a typo'd input path
/// fails fast instead of surfacing as an obscure tool error.
pub fn ensure_input_files<'a, I>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        if !path.is_file() {
            return Err(ValidationError::NotAFile(path.to_path_buf()).into());
        }
    }
    Ok(())
}

/// Pin a caller-supplied path to the current directory.
///
/// The pipelines run their children with a working directory of their
/// own choosing, so relative paths must be resolved against the caller's
/// cwd before they go into an argument list or a glob pattern.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Check that a path is an existing directory
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(ValidationError::NotADirectory(path.to_path_buf()).into());
    }
    Ok(())
}

/// Resolve the single file an FSL tool produced for an output root.
///
/// FSL appends the compression suffix it was built with (`.nii.gz` by
/// default), so callers only know the root. The first match in sorted
/// order wins when several suffixes exist.
pub fn resolve_output(pattern: &str) -> Result<PathBuf> {
    let entries = glob(pattern)
        .map_err(|e| ValidationError::Pattern(pattern.to_string(), e.to_string()))?;
    let mut matches: Vec<PathBuf> = entries.filter_map(std::result::Result::ok).collect();
    matches.sort();
    matches
        .into_iter()
        .next()
        .ok_or_else(|| ValidationError::MissingOutput(pattern.to_string()).into())
}

/// Directory a pipeline output lands in: the path's parent, or the
/// current directory for bare file names.
pub fn parent_or_cwd(path: &Path) -> Result<PathBuf> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(std::env::current_dir()?),
    }
}

/// Basename of an image path with every extension stripped
/// (`sub01_FA.nii.gz` becomes `sub01_FA`).
pub fn image_basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn missing_input_is_a_validation_error() {
        let err = ensure_input_files([Path::new("/no/such/image.nii.gz")]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::NotAFile(_))
        ));
    }

    #[test]
    fn absolutize_resolves_against_the_current_directory() {
        let pinned = absolutize(Path::new("out/t1_reo")).expect("absolutize");
        assert!(pinned.is_absolute());
        assert!(pinned.ends_with("out/t1_reo"));

        let already = Path::new("/data/t1.nii.gz");
        assert_eq!(absolutize(already).expect("absolutize"), already);
    }

    #[test]
    fn resolve_output_picks_the_suffixed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let produced = dir.path().join("brain.nii.gz");
        fs::write(&produced, b"").expect("write");

        let pattern = format!("{}*", dir.path().join("brain").display());
        assert_eq!(resolve_output(&pattern).expect("resolved"), produced);
    }

    #[test]
    fn image_basename_strips_compound_extensions() {
        assert_eq!(
            image_basename(Path::new("/data/sub01_FA.nii.gz")),
            "sub01_FA"
        );
        assert_eq!(image_basename(Path::new("plain")), "plain");
    }

    #[test]
    fn resolve_output_without_matches_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pattern = format!("{}*", dir.path().join("absent").display());
        let err = resolve_output(&pattern).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::MissingOutput(_))
        ));
    }
}
