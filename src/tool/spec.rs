//! Explicit configuration for one managed tool
//! ===========================================
//!
//! A [`ToolSpec`] captures *every* input needed to locate, install, and run
//! one external executable: release coordinates, the pinned version, TLS and
//! cache overrides, and the named [`Profile`]s that describe how the tool is
//! invoked. There is deliberately no ambient or global configuration store;
//! the spec is an ordinary value passed into each call.
//!
//! # Typical lifecycle
//!
//! ```rust,ignore
//! let spec = ToolSpec::builder()
//!     .name("esbuild")
//!     .version("0.21.5")
//!     .owner("evanw")
//!     .repo("esbuild")
//!     .profile("assets", Profile {
//!         cwd: Some("assets".into()),
//!         env: Default::default(),
//!         args: vec!["--bundle".into()],
//!     })
//!     .build()?;
//! ```
//!
//! The same structure round-trips through TOML, which is how the `fetchbin`
//! CLI consumes it (`ToolSpec::load`).

use std::{collections::BTreeMap, path::PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FetchbinError, FetchbinResult},
    tool::{paths::EnsuredDir, target::Target},
};

pub const DEFAULT_RELEASE_HOST: &str = "https://github.com";
pub const DEFAULT_VERSION_FLAG: &str = "--version";

/// Profile name that resolves to [`Profile::default`] when the config does
/// not define it explicitly. Every other unknown name is a hard error.
pub const DEFAULT_PROFILE: &str = "default";

/// A named invocation bundle: working directory, environment overlay, and
/// baseline arguments prepended to whatever the caller passes at run time.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// Working directory for the child process. Relative paths are resolved
    /// against the caller's current directory at spawn time.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Environment variables merged *onto* the parent environment. The
    /// parent environment is never replaced.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Arguments placed before the caller-supplied trailing arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// All inputs required to obtain and invoke one managed executable.
///
/// Finish the builder with [`build`](ToolSpecBuilder::build), which
/// validates the collected fields and returns a typed error instead of
/// panicking on bad input.
#[derive(Serialize, Deserialize, Debug, Clone, Builder)]
#[builder(derive(Debug, Clone), finish_fn(vis = "", name = build_internal))]
pub struct ToolSpec {
    /// Named invocation profiles, keyed by profile name.
    #[builder(field)]
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Executable name of the managed tool, e.g. `esbuild`.
    #[builder(into)]
    pub name: String,

    /// Pinned release tag. Installed copies reporting a different version
    /// trigger a warning but are still used.
    #[builder(into)]
    pub version: String,

    /// Release repository owner, e.g. `evanw`.
    #[builder(into)]
    pub owner: String,

    /// Release repository name, e.g. `esbuild`.
    #[builder(into)]
    pub repo: String,

    /// Base URL of the release host. Overridable for mirrors.
    #[builder(default = DEFAULT_RELEASE_HOST.to_string(), into)]
    #[serde(default = "default_release_host")]
    pub release_host: String,

    /// Flag used to probe the installed executable's version.
    #[builder(default = DEFAULT_VERSION_FLAG.to_string(), into)]
    #[serde(default = "default_version_flag")]
    pub version_flag: String,

    /// A custom path to the executable. When set, auto-install is bypassed
    /// entirely and this path is validated and used as-is.
    #[builder(into)]
    #[serde(default)]
    pub custom_bin_path: Option<PathBuf>,

    /// Cache root override. Falls back to `FETCHBIN_INSTALL_DIR`, then the
    /// platform data directory.
    #[builder(with = |dir: impl TryInto<EnsuredDir, Error = FetchbinError>| -> FetchbinResult<_> {
        dir.try_into()
    })]
    #[serde(default)]
    pub override_root: Option<EnsuredDir>,

    /// PEM certificate bundle used to verify the release host. When unset,
    /// the bundled default trust store is used.
    #[builder(into)]
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
}

fn default_release_host() -> String {
    DEFAULT_RELEASE_HOST.to_string()
}

fn default_version_flag() -> String {
    DEFAULT_VERSION_FLAG.to_string()
}

use tool_spec_builder::{IsComplete, State};

impl<S: State> ToolSpecBuilder<S> {
    /// Register a single named profile. Re-registering a name replaces the
    /// previous entry.
    pub fn profile(mut self, name: impl Into<String>, profile: Profile) -> Self {
        self.profiles.insert(name.into(), profile);
        self
    }

    /// Register many profiles at once.
    pub fn profiles<I, N>(self, profiles: I) -> Self
    where
        I: IntoIterator<Item = (N, Profile)>,
        N: Into<String>,
    {
        profiles
            .into_iter()
            .fold(self, |b, (n, p)| b.profile(n, p))
    }
}

impl<S: IsComplete> ToolSpecBuilder<S> {
    pub fn build(self) -> FetchbinResult<ToolSpec> {
        let spec = self.build_internal();
        spec.validate()?;
        Ok(spec)
    }
}

impl ToolSpec {
    /// Read and validate a spec from a TOML file. This is the CLI's config
    /// surface; library callers usually go through the builder instead.
    pub fn load(path: impl AsRef<std::path::Path>) -> FetchbinResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FetchbinError::file_system("read config file", path, e))?;
        let spec: ToolSpec = toml::from_str(&raw).map_err(|e| FetchbinError::InvalidConfig {
            field: "config file",
            reason: format!("{}: {e}", path.display()),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Field-level validation shared by the builder and `load`.
    pub(crate) fn validate(&self) -> FetchbinResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("version_flag", &self.version_flag),
        ] {
            if value.trim().is_empty() {
                return Err(FetchbinError::InvalidConfig {
                    field,
                    reason: "cannot be empty".into(),
                });
            }
        }
        if !self.release_host.starts_with("http://") && !self.release_host.starts_with("https://") {
            return Err(FetchbinError::InvalidConfig {
                field: "release_host",
                reason: format!("`{}` is not an http(s) URL", self.release_host),
            });
        }
        if self.profiles.keys().any(|k| k.trim().is_empty()) {
            return Err(FetchbinError::InvalidConfig {
                field: "profiles",
                reason: "profile names cannot be empty".into(),
            });
        }
        Ok(())
    }

    /// Resolve a named profile. The literal name `default` falls back to
    /// [`Profile::default`] when the config does not define it; any other
    /// unknown name is a configuration error listing the known names.
    pub fn profile(&self, name: &str) -> FetchbinResult<Profile> {
        if let Some(p) = self.profiles.get(name) {
            return Ok(p.clone());
        }
        if name == DEFAULT_PROFILE {
            return Ok(Profile::default());
        }
        let known = if self.profiles.is_empty() {
            "none configured".to_string()
        } else {
            self.profiles
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(FetchbinError::UnknownProfile {
            name: name.to_string(),
            known,
        })
    }

    /// Platform-specific executable file name.
    pub fn exe_name(&self) -> String {
        if cfg!(target_os = "windows") {
            format!("{}.exe", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Directory name under the cache root holding this `name × version`.
    pub fn cache_dir_name(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }

    /// Fully-qualified URL of the release archive for `target`.
    pub fn release_url(&self, target: Target) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}-{}.tar.gz",
            self.release_host.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.version,
            self.name,
            target
        )
    }

    /// Relative path of the executable inside the extracted archive:
    /// `<name>-<target>/<name>[.exe]`.
    pub fn archive_member(&self, target: Target) -> PathBuf {
        PathBuf::from(format!("{}-{}", self.name, target)).join(self.exe_name())
    }
}

impl std::fmt::Display for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        writeln!(f, "ToolSpec:")?;
        let mut indented = indenter::indented(f).with_str("   ");
        writeln!(indented, "Name: {}", self.name)?;
        writeln!(indented, "Version: {}", self.version)?;
        writeln!(indented, "Release: {}/{}/{}", self.release_host, self.owner, self.repo)?;
        if let Some(custom) = &self.custom_bin_path {
            writeln!(indented, "Custom bin path: {}", custom.display())?;
        }
        if !self.profiles.is_empty() {
            writeln!(
                indented,
                "Profiles: {}",
                self.profiles
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! minimal {
        () => {
            ToolSpec::builder()
                .name("esbuild")
                .version("0.21.5")
                .owner("evanw")
                .repo("esbuild")
        };
    }

    #[test]
    fn builder_defaults_are_sane() {
        let spec = minimal!().build().expect("minimal spec must build");
        assert_eq!(spec.release_host, DEFAULT_RELEASE_HOST);
        assert_eq!(spec.version_flag, DEFAULT_VERSION_FLAG);
        assert!(spec.profiles.is_empty());
        assert!(spec.custom_bin_path.is_none());
    }

    #[test]
    fn builder_invalid_inputs_error_out() {
        let cases: Vec<(&str, FetchbinResult<ToolSpec>)> = vec![
            (
                "empty name",
                ToolSpec::builder()
                    .name("")
                    .version("v1")
                    .owner("o")
                    .repo("r")
                    .build(),
            ),
            (
                "empty version",
                ToolSpec::builder()
                    .name("t")
                    .version("")
                    .owner("o")
                    .repo("r")
                    .build(),
            ),
            (
                "empty owner",
                ToolSpec::builder()
                    .name("t")
                    .version("v1")
                    .owner("")
                    .repo("r")
                    .build(),
            ),
            (
                "bad release host",
                ToolSpec::builder()
                    .name("t")
                    .version("v1")
                    .owner("o")
                    .repo("r")
                    .release_host("ftp://mirror")
                    .build(),
            ),
            (
                "empty profile name",
                ToolSpec::builder()
                    .name("t")
                    .version("v1")
                    .owner("o")
                    .repo("r")
                    .profile("", Profile::default())
                    .build(),
            ),
        ];

        for (name, res) in cases {
            assert!(res.is_err(), "builder must reject invalid input: {name}");
        }
    }

    #[test]
    fn release_url_shape() {
        let spec = minimal!().build().unwrap();
        assert_eq!(
            spec.release_url(Target::LinuxX64),
            "https://github.com/evanw/esbuild/releases/download/0.21.5/esbuild-linux-x64.tar.gz"
        );

        // Trailing slash on the host must not double up.
        let spec = minimal!().release_host("http://127.0.0.1:8080/").build().unwrap();
        assert!(
            spec.release_url(Target::LinuxX64)
                .starts_with("http://127.0.0.1:8080/evanw/")
        );
    }

    #[cfg(unix)]
    #[test]
    fn archive_member_layout() {
        let spec = minimal!().build().unwrap();
        assert_eq!(
            spec.archive_member(Target::DarwinArm64),
            std::path::Path::new("esbuild-darwin-arm64/esbuild")
        );
    }

    #[test]
    fn profile_resolution() {
        let configured = Profile {
            cwd: Some("assets".into()),
            env: Default::default(),
            args: vec!["--bundle".into()],
        };
        let spec = minimal!()
            .profile("assets", configured.clone())
            .build()
            .unwrap();

        // Explicitly configured profile.
        assert_eq!(spec.profile("assets").unwrap(), configured);

        // `default` synthesised when absent.
        assert_eq!(spec.profile(DEFAULT_PROFILE).unwrap(), Profile::default());

        // Anything else is a configuration error naming the known profiles.
        let err = spec.profile("deploy").unwrap_err();
        assert!(err.to_string().contains("deploy"));
        assert!(err.to_string().contains("assets"));
    }

    #[test]
    fn toml_round_trip() {
        let raw = r#"
            name = "esbuild"
            version = "0.21.5"
            owner = "evanw"
            repo = "esbuild"

            [profiles.default]
            args = ["--bundle", "--minify"]
            cwd = "assets"

            [profiles.default.env]
            NODE_PATH = "deps"
        "#;
        let spec: ToolSpec = toml::from_str(raw).unwrap();
        spec.validate().unwrap();

        let profile = spec.profile("default").unwrap();
        assert_eq!(profile.args, vec!["--bundle", "--minify"]);
        assert_eq!(profile.cwd.as_deref(), Some(std::path::Path::new("assets")));
        assert_eq!(profile.env.get("NODE_PATH").map(String::as_str), Some("deps"));
    }

    #[test]
    fn load_rejects_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fetchbin.toml");
        std::fs::write(&path, "name = ").unwrap();
        assert!(ToolSpec::load(&path).is_err());

        // Missing file is a filesystem error, not a parse error.
        let err = ToolSpec::load(tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("read config file"));
    }
}
