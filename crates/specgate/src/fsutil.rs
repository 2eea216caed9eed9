//! Filesystem primitives shared by the registration and generation paths.
//!
//! All helpers return [`FsError`] so callers can distinguish a missing input
//! from a genuine I/O failure without string matching.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the probe file used by [`is_writable_directory`].
const WRITE_PROBE_FILE: &str = ".writetest.tmp";

#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    Missing(PathBuf),
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Make sure `path` is a directory, creating intermediate directories as
/// needed. Fails when the path exists but is not a directory.
pub fn ensure_directory(path: &Path) -> Result<(), FsError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(FsError::NotADirectory(path.to_path_buf()));
    }
    fs::create_dir_all(path)
        .map_err(|e| FsError::io(format!("failed to create directory {}", path.display()), e))
}

/// Read the whole file as bytes.
pub fn read_file(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            FsError::Missing(path.to_path_buf())
        } else {
            FsError::io(format!("failed to read file {}", path.display()), e)
        }
    })
}

/// Truncating binary write. The parent directory must already exist.
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), FsError> {
    fs::write(path, content)
        .map_err(|e| FsError::io(format!("failed to write file {}", path.display()), e))
}

/// Copy `source` to `destination`, creating the destination's parent
/// directories and overwriting any existing file.
pub fn copy_file_to(source: &Path, destination: &Path) -> Result<(), FsError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::copy(source, destination).map_err(|e| {
        FsError::io(
            format!(
                "failed to copy {} to {}",
                source.display(),
                destination.display()
            ),
            e,
        )
    })?;
    Ok(())
}

/// Make sure `path` is a directory we can write into, by creating and
/// removing a probe file. A failure to remove the probe does not fail the
/// check.
pub fn is_writable_directory(path: &Path) -> Result<(), FsError> {
    ensure_directory(path)?;
    let probe = path.join(WRITE_PROBE_FILE);
    write_file(&probe, b"probe")?;
    let _ = fs::remove_file(&probe);
    Ok(())
}
