//! Output file housekeeping around a pipeline run.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use segstitch_core::PipelineError;
use tracing::info;

/// Creates the parent directory of `output` if it is missing.
pub(crate) fn prepare_output_dir(output: &Path) -> Result<()> {
    let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory '{}'", parent.display()))?;
        info!(dir = %parent.display(), "Created output directory");
    }
    Ok(())
}

/// Refuses to start a run that would clobber an existing recording.
pub(crate) fn ensure_output_absent(output: &Path) -> Result<()> {
    if output.exists() {
        bail!(
            "Output file '{}' already exists; refusing to overwrite it",
            output.display()
        );
    }
    Ok(())
}

/// Whether the aborted run owns the file at the output path.
///
/// A run that lost the race to create the output never wrote to it, so the
/// file there belongs to someone else and must not be cleaned up.
pub(crate) fn run_created_output(error: &PipelineError) -> bool {
    !matches!(
        error,
        PipelineError::Sink { source, .. } if source.kind() == io::ErrorKind::AlreadyExists
    )
}

/// `record.ts` becomes `record.ts.partial`.
pub(crate) fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map_or_else(|| OsString::from("output"), OsString::from);
    name.push(".partial");
    output.with_file_name(name)
}

/// Deals with the output of an aborted run.
///
/// With `keep` the file is renamed to its `.partial` name and that path is
/// returned; otherwise it is deleted. A file that was never created is not
/// an error.
pub(crate) fn dispose_partial_output(output: &Path, keep: bool) -> Result<Option<PathBuf>> {
    if keep {
        let target = partial_path(output);
        return match fs::rename(output, &target) {
            Ok(()) => Ok(Some(target)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!(
                    "Failed to move partial output '{}' to '{}'",
                    output.display(),
                    target.display()
                )
            }),
        };
    }

    match fs::remove_file(output) {
        Ok(()) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to remove partial output '{}'", output.display())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/srv/rec/live.ts")),
            PathBuf::from("/srv/rec/live.ts.partial")
        );
        assert_eq!(partial_path(Path::new("out")), PathBuf::from("out.partial"));
    }

    #[test]
    fn test_prepare_output_dir_creates_nested_parent() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("a").join("b").join("rec.ts");

        prepare_output_dir(&output).unwrap();
        assert!(temp_dir.path().join("a").join("b").is_dir());
        assert!(!output.exists());
    }

    #[test]
    fn test_prepare_output_dir_accepts_bare_file_name() {
        prepare_output_dir(Path::new("rec.ts")).unwrap();
    }

    #[test]
    fn test_existing_output_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("rec.ts");
        ensure_output_absent(&output).unwrap();

        fs::write(&output, b"earlier recording").unwrap();
        let err = ensure_output_absent(&output).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read(&output).unwrap(), b"earlier recording");
    }

    #[test]
    fn test_output_left_alone_when_run_could_not_create_it() {
        let exists = PipelineError::Sink {
            path: PathBuf::from("rec.ts"),
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        };
        assert!(!run_created_output(&exists));

        let disk_full = PipelineError::Sink {
            path: PathBuf::from("rec.ts"),
            source: io::Error::other("no space left on device"),
        };
        assert!(run_created_output(&disk_full));
        assert!(run_created_output(&PipelineError::Interrupted { index: 3 }));
    }

    #[test]
    fn test_dispose_deletes_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("rec.ts");
        fs::write(&output, b"prefix").unwrap();

        assert_eq!(dispose_partial_output(&output, false).unwrap(), None);
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn test_dispose_keep_renames_to_partial() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("rec.ts");
        fs::write(&output, b"prefix").unwrap();

        let kept = dispose_partial_output(&output, true).unwrap().unwrap();
        assert_eq!(kept, temp_dir.path().join("rec.ts.partial"));
        assert!(!output.exists());
        assert_eq!(fs::read(&kept).unwrap(), b"prefix");
    }

    #[test]
    fn test_dispose_missing_file_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("never-created.ts");

        assert_eq!(dispose_partial_output(&output, false).unwrap(), None);
        assert_eq!(dispose_partial_output(&output, true).unwrap(), None);
    }
}
