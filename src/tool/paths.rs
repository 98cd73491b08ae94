//! Filesystem primitives for the install cache.
//!
//! [`EnsuredDir`] wraps a canonical path that is guaranteed to reference an
//! existing directory, with `mkdir -p` semantics at construction. Holding one
//! lets the rest of the crate hand paths to `std::fs` without re-checking.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{FetchbinError, FetchbinResult};

/// A *canonical* path guaranteed to reference an **existing directory**.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EnsuredDir(pub PathBuf);

impl EnsuredDir {
    /// Construct an `EnsuredDir`, creating the directory tree if it does not
    /// yet exist.
    ///
    /// # Errors
    /// * I/O failures during directory creation or path resolution.
    /// * The path resolves to something that is **not** a directory.
    pub fn new<P: AsRef<Path>>(p: P) -> FetchbinResult<Self> {
        let path = p.as_ref();

        // No-op when the tree already exists; fails early when a path
        // component is a regular file.
        std::fs::create_dir_all(path)
            .map_err(|e| FetchbinError::file_system("create cache dir", path, e))?;

        let canonical = path
            .canonicalize()
            .map_err(|e| FetchbinError::file_system("resolve cache dir", path, e))?;

        // Canonicalisation follows symlinks, so the final target can still
        // be a file even after create_dir_all succeeded.
        if !canonical.is_dir() {
            return Err(FetchbinError::file_system(
                "open cache dir",
                path,
                std::io::Error::new(
                    ErrorKind::NotADirectory,
                    "path resolves to a non-directory",
                ),
            ));
        }

        Ok(Self(canonical))
    }

    /// Delete the directory (recursively) and recreate it empty. Used for
    /// scratch space that must start from a clean slate.
    pub fn reset(&self) -> FetchbinResult<()> {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            // Already gone is fine; anything else is not.
            if e.kind() != ErrorKind::NotFound {
                return Err(FetchbinError::file_system("clear scratch dir", &self.0, e));
            }
        }
        std::fs::create_dir_all(&self.0)
            .map_err(|e| FetchbinError::file_system("recreate scratch dir", &self.0, e))
    }

    /// Permanently remove the directory and do *not* recreate it.
    pub fn remove(&self) -> FetchbinResult<()> {
        std::fs::remove_dir_all(&self.0)
            .map_err(|e| FetchbinError::file_system("delete dir", &self.0, e))
    }
}

impl std::ops::Deref for EnsuredDir {
    type Target = Path;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for EnsuredDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<PathBuf> for EnsuredDir {
    type Error = FetchbinError;
    fn try_from(value: PathBuf) -> FetchbinResult<Self> {
        Self::new(value)
    }
}

impl<'a> TryFrom<&'a Path> for EnsuredDir {
    type Error = FetchbinError;
    fn try_from(value: &'a Path) -> FetchbinResult<Self> {
        Self::new(value)
    }
}

impl<'a> TryFrom<&'a str> for EnsuredDir {
    type Error = FetchbinError;
    fn try_from(value: &'a str) -> FetchbinResult<Self> {
        Self::new(value)
    }
}

/// Set mode `0755` (`rwxr-xr-x`) on an installed executable.
///
/// No-op on non-Unix targets so builds remain portable.
pub fn set_executable(path: &Path) -> FetchbinResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| FetchbinError::file_system("make executable", path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
