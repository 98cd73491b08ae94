//! Installer: download, extract, publish
//! =====================================
//!
//! [`install`] performs one fresh end-to-end install; [`ensure_installed`]
//! is the task-facing wrapper that skips the network entirely when a binary
//! is already present (or when the spec pins a `custom_bin_path`).
//!
//! There is deliberately no rollback and no locking: a failed install may
//! leave an empty or stale cache directory behind, and two concurrent
//! installs against the same root race each other (last writer wins). Both
//! limitations are part of this crate's contract; see the crate docs.

use std::{path::PathBuf, time::Duration};

use serde::Serialize;

use crate::{
    error::{FetchbinError, FetchbinResult},
    tool::{
        fetch::fetch_release,
        home::ToolHome,
        paths::{EnsuredDir, set_executable},
        spec::ToolSpec,
        tarball::extract_tar_gz,
        target::Target,
    },
};

/// How the executable reported by an [`InstallOutcome`] came to be.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    /// Downloaded and published by this call.
    Installed,
    /// A binary was already present; the downloader was not invoked.
    AlreadyInstalled,
    /// The spec pins an explicit executable path; auto-install bypassed.
    CustomBinPath,
}

/// Summary returned by [`install`] and [`ensure_installed`].
#[derive(Serialize, Debug, Clone)]
pub struct InstallOutcome {
    /// End-to-end wall-clock time spent in the workflow.
    pub duration: Duration,
    /// Pinned version from the spec.
    pub version: String,
    /// Detected release target; `None` for custom binary paths.
    pub target: Option<Target>,
    /// Absolute path of the executable to invoke.
    pub bin_path: PathBuf,
    pub status: InstallStatus,
}

impl std::fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        writeln!(f, "InstallOutcome:")?;
        let mut indented = indenter::indented(f).with_str("   ");
        writeln!(indented, "Status: {:?}", self.status)?;
        writeln!(indented, "Version: {}", self.version)?;
        if let Some(target) = self.target {
            writeln!(indented, "Target: {target}")?;
        }
        writeln!(indented, "Binary path: {}", self.bin_path.display())?;
        writeln!(indented, "Duration: {:?}", self.duration)?;
        Ok(())
    }
}

/// Download the pinned release archive and publish its executable,
/// overwriting whatever was installed before.
///
/// Steps: reset the per-version scratch directory, GET the archive, extract
/// it, locate `<name>-<target>/<name>` inside the tree, copy it to
/// `bin/` and set mode 0755.
pub fn install(spec: &ToolSpec) -> FetchbinResult<InstallOutcome> {
    let t0 = std::time::Instant::now();

    let target = Target::detect()?;
    let home = ToolHome::resolve(spec)?;

    // Fresh scratch space; stale files from an earlier attempt are purged.
    let working_dir = EnsuredDir::new(home.working_dir_path())
        .and_then(|d| d.reset().map(|_| d))
        .map_err(relocate_hint)?;

    let archive = fetch_release(spec, target)?;
    extract_tar_gz(&archive, &working_dir)?;

    let member = working_dir.join(spec.archive_member(target));
    if !member.is_file() {
        return Err(FetchbinError::Archive {
            reason: format!(
                "expected `{}` inside the release archive",
                spec.archive_member(target).display()
            ),
        });
    }

    let bin_path = home.bin_path();
    let bin_dir = home.bin_dir();
    std::fs::create_dir_all(&bin_dir)
        .map_err(|e| FetchbinError::file_system("create bin dir", &bin_dir, e))?;
    std::fs::copy(&member, &bin_path)
        .map_err(|e| FetchbinError::file_system("copy executable", &bin_path, e))?;
    set_executable(&bin_path)?;

    if let Err(e) = working_dir.remove() {
        crate::warn!("Failed to clean up scratch dir after install: {e}");
    }

    let duration = t0.elapsed();
    crate::trace!(
        "Installed {} {} for {} in {:02}:{:02}.{:03}",
        spec.name,
        spec.version,
        target,
        duration.as_secs() / 60,
        duration.as_secs() % 60,
        duration.subsec_millis(),
    );

    Ok(InstallOutcome {
        duration,
        version: spec.version.clone(),
        target: Some(target),
        bin_path,
        status: InstallStatus::Installed,
    })
}

/// Install only if no executable is present yet.
///
/// When a binary already exists its version is probed and compared against
/// the pinned version; a mismatch (or an unreadable version) is a warning
/// only, and the installed binary is used as-is. The check and the install
/// are two sequential, non-atomic steps with no mutual exclusion.
pub fn ensure_installed(spec: &ToolSpec) -> FetchbinResult<InstallOutcome> {
    let t0 = std::time::Instant::now();

    if let Some(custom) = &spec.custom_bin_path {
        if !custom.is_file() {
            return Err(FetchbinError::InvalidConfig {
                field: "custom_bin_path",
                reason: format!("`{}` is not a file", custom.display()),
            });
        }
        return Ok(InstallOutcome {
            duration: t0.elapsed(),
            version: spec.version.clone(),
            target: None,
            bin_path: custom.clone(),
            status: InstallStatus::CustomBinPath,
        });
    }

    let home = ToolHome::resolve(spec)?;
    if home.bin_path().is_file() {
        match home.installed_version() {
            Some(v) if v == spec.version => {
                crate::trace!("{} {} already installed", spec.name, spec.version);
            }
            Some(v) => {
                crate::warn!(
                    "Installed {} reports version {v}, but {} is pinned; using the installed binary",
                    spec.name,
                    spec.version,
                );
            }
            None => {
                crate::warn!(
                    "Installed {} did not report a version; using it anyway",
                    spec.name,
                );
            }
        }
        return Ok(InstallOutcome {
            duration: t0.elapsed(),
            version: spec.version.clone(),
            target: None,
            bin_path: home.bin_path(),
            status: InstallStatus::AlreadyInstalled,
        });
    }

    install(spec)
}

/// Scratch-directory failures usually mean an unusable cache root, so the
/// message points at the override.
fn relocate_hint(e: FetchbinError) -> FetchbinError {
    match e {
        FetchbinError::FileSystem { path, source, .. } => FetchbinError::FileSystem {
            operation: "prepare scratch dir (set FETCHBIN_INSTALL_DIR to relocate the cache)",
            path,
            source,
        },
        other => other,
    }
}
