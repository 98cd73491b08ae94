//! Host platform identifier used to select the release archive.

use serde::{Deserialize, Serialize};

use crate::error::{FetchbinError, FetchbinResult};

/// OS/architecture pair an upstream project publishes archives for.
///
/// The string form (`linux-x64`, `darwin-arm64`, …) is the `<target>`
/// component of the release file name `<name>-<target>.tar.gz` and of the
/// archive's top-level directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    LinuxX64,
    LinuxArm64,
    DarwinX64,
    DarwinArm64,
    Win32X64,
}

impl Target {
    /// Detect the target for the running host.
    ///
    /// # Errors
    /// [`FetchbinError::UnsupportedPlatform`] when no release archive naming
    /// convention exists for this OS/architecture pair.
    pub fn detect() -> FetchbinResult<Self> {
        use std::env::consts::{ARCH, OS};
        match (OS, ARCH) {
            ("linux", "x86_64") => Ok(Target::LinuxX64),
            ("linux", "aarch64") => Ok(Target::LinuxArm64),
            ("macos", "x86_64") => Ok(Target::DarwinX64),
            ("macos", "aarch64") => Ok(Target::DarwinArm64),
            ("windows", "x86_64") => Ok(Target::Win32X64),
            _ => Err(FetchbinError::UnsupportedPlatform { os: OS, arch: ARCH }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::LinuxX64 => "linux-x64",
            Target::LinuxArm64 => "linux-arm64",
            Target::DarwinX64 => "darwin-x64",
            Target::DarwinArm64 => "darwin-arm64",
            Target::Win32X64 => "win32-x64",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
