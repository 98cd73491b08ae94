//! Executable locator: where the managed tool lives on disk
//! =========================================================
//!
//! Resolves the cache root for a [`ToolSpec`] and derives the deterministic
//! paths below it. The layout mirrors one directory per `name × version`:
//!
//! ```text
//! <cache-root>/                       # e.g. ~/.local/share/fetchbin/<name>
//! └── <name>_<version>/
//!     ├── working_dir/   # scratch space (ephemeral, reset on install)
//!     └── bin/           # published artifact
//!         └── <name>[.exe]
//! ```
//!
//! Root resolution precedence: explicit `override_root` on the spec → the
//! `FETCHBIN_INSTALL_DIR` environment variable → the platform-native data
//! directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    error::{FetchbinError, FetchbinResult},
    tool::{paths::EnsuredDir, spec::ToolSpec},
};

pub const INSTALL_DIR_ENV: &str = "FETCHBIN_INSTALL_DIR";

/// Resolved on-disk home of one `name × version` of the managed tool.
#[derive(Debug, Clone)]
pub struct ToolHome {
    root: EnsuredDir,
    cache_dir: PathBuf,
    exe_name: String,
    version_flag: String,
}

impl ToolHome {
    /// Resolve the cache root and derive the per-version paths. Creates the
    /// root directory if needed; everything below it is created lazily by
    /// the installer.
    pub fn resolve(spec: &ToolSpec) -> FetchbinResult<Self> {
        let root = Self::resolve_root(spec.override_root.as_ref(), &spec.name)?;
        let cache_dir = root.join(spec.cache_dir_name());
        Ok(Self {
            root,
            cache_dir,
            exe_name: spec.exe_name(),
            version_flag: spec.version_flag.clone(),
        })
    }

    fn resolve_root(override_root: Option<&EnsuredDir>, name: &str) -> FetchbinResult<EnsuredDir> {
        // 1. explicit path from the caller
        if let Some(p) = override_root {
            return EnsuredDir::new(p);
        }

        // 2. environment variable (only when actually set)
        if let Some(p) = std::env::var_os(INSTALL_DIR_ENV).map(PathBuf::from) {
            return EnsuredDir::new(p);
        }

        // 3. platform-native data directory
        let project_dir = directories::ProjectDirs::from("com", "fetchbin", name).ok_or_else(
            || {
                FetchbinError::file_system(
                    "resolve cache root",
                    name,
                    std::io::Error::new(
                        ErrorKind::NotFound,
                        "Failed to resolve platform-native data directory",
                    ),
                )
            },
        )?;
        let p = EnsuredDir::new(project_dir.data_dir())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| FetchbinError::file_system("resolve cache root", p.as_ref(), e))?;
        }
        Ok(p)
    }

    pub fn root(&self) -> &EnsuredDir {
        &self.root
    }

    /// Directory holding this `name × version`; `remove` deletes it whole.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.cache_dir.join("bin")
    }

    /// Deterministic path of the installed executable. The file may or may
    /// not exist; this never touches the filesystem.
    pub fn bin_path(&self) -> PathBuf {
        self.bin_dir().join(&self.exe_name)
    }

    /// Ephemeral scratch directory used during install.
    pub fn working_dir_path(&self) -> PathBuf {
        self.cache_dir.join("working_dir")
    }

    /// Version reported by the installed executable, or `None`.
    ///
    /// The error model is deliberately collapsed: a missing file, a spawn
    /// failure, a non-zero exit, and empty output all report `None`.
    /// Callers cannot (and should not) distinguish "missing" from "broken".
    pub fn installed_version(&self) -> Option<String> {
        probe_version(&self.bin_path(), &self.version_flag)
    }

    /// Delete all cached artifacts for this `name × version`.
    pub fn remove(&self) -> FetchbinResult<()> {
        if self.cache_dir.exists() {
            std::fs::remove_dir_all(&self.cache_dir)
                .map_err(|e| FetchbinError::file_system("remove cache dir", &self.cache_dir, e))?;
        }
        Ok(())
    }
}

/// Run `<bin> <flag>` and return trimmed stdout, collapsing every failure
/// mode to `None`.
pub fn probe_version(bin: &Path, flag: &str) -> Option<String> {
    if !bin.is_file() {
        return None;
    }
    let out = Command::new(bin).arg(flag).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if version.is_empty() { None } else { Some(version) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_root(root: &Path) -> ToolSpec {
        ToolSpec::builder()
            .name("demo")
            .version("v1.0.0")
            .owner("acme")
            .repo("demo")
            .override_root(root)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn fresh_environment_reports_no_version() {
        let tmp = tempfile::tempdir().unwrap();
        let home = ToolHome::resolve(&spec_with_root(tmp.path())).unwrap();

        assert!(!home.bin_path().exists());
        assert_eq!(home.installed_version(), None);
    }

    #[test]
    fn paths_are_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_with_root(tmp.path());

        let a = ToolHome::resolve(&spec).unwrap();
        let b = ToolHome::resolve(&spec).unwrap();
        assert_eq!(a.bin_path(), b.bin_path());
        assert!(a.bin_path().starts_with(tmp.path().canonicalize().unwrap()));
        assert!(a.bin_path().ends_with("demo_v1.0.0/bin/demo") || cfg!(windows));
    }

    #[cfg(unix)]
    #[test]
    fn probe_version_trims_stdout() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("demo");
        std::fs::write(&script, "#!/bin/sh\necho ' v1.0.0 '\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(probe_version(&script, "--version").as_deref(), Some("v1.0.0"));
    }

    #[cfg(unix)]
    #[test]
    fn probe_failures_collapse_to_none() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().unwrap();

        // Missing file.
        assert_eq!(probe_version(&tmp.path().join("ghost"), "--version"), None);

        // Non-zero exit.
        let failing = tmp.path().join("broken");
        std::fs::write(&failing, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&failing, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(probe_version(&failing, "--version"), None);

        // Not executable at all (spawn error).
        let plain = tmp.path().join("plain");
        std::fs::write(&plain, "not a program").unwrap();
        assert_eq!(probe_version(&plain, "--version"), None);
    }

    #[test]
    #[serial_test::serial]
    fn env_var_overrides_platform_dir() {
        let env_dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var(INSTALL_DIR_ENV, env_dir.path());
        }

        let spec = ToolSpec::builder()
            .name("demo")
            .version("v1")
            .owner("acme")
            .repo("demo")
            .build()
            .unwrap();
        let home = ToolHome::resolve(&spec).unwrap();

        unsafe {
            std::env::remove_var(INSTALL_DIR_ENV);
        }
        assert_eq!(
            home.root().as_ref(),
            env_dir.path().canonicalize().unwrap()
        );
    }
}
