//! Command runner: one blocking child process
//! ==========================================
//!
//! Spawns the managed executable with a validated argument list and a
//! [`RunSettings`] bundle, blocks until it exits, and returns its exit code.
//! There is no supervision, restart, timeout, or cancellation; a hung child
//! blocks the caller indefinitely, by contract.
//!
//! The default [`OutputMode::Stream`] forwards the child's stdout *and*
//! stderr to the parent's standard output line by line, as soon as each
//! line arrives, so long-running tools keep their real-time feedback.

use std::{
    collections::BTreeMap,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use bon::Builder;

use crate::{
    error::{FetchbinError, FetchbinResult},
    tool::{install::ensure_installed, spec::Profile, spec::ToolSpec},
};

/// What happens to the child's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Line-buffered forwarding of stdout and stderr (merged) to the
    /// parent's standard output.
    #[default]
    Stream,
    /// Raw passthrough of the parent's stdio descriptors.
    Inherit,
}

/// Per-invocation configuration for the child process.
#[derive(Debug, Clone, Default, Builder)]
pub struct RunSettings {
    /// Working directory; defaults to the caller's current directory.
    #[builder(into)]
    pub cwd: Option<PathBuf>,

    /// Environment overlay, merged *onto* the parent environment. The
    /// parent environment is never replaced.
    #[builder(default)]
    pub env: BTreeMap<String, String>,

    #[builder(default)]
    pub output: OutputMode,

    /// Unix-only override of the process name (`argv[0]`).
    #[builder(into)]
    pub argv0: Option<String>,
}

impl RunSettings {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            cwd: profile.cwd.clone(),
            env: profile.env.clone(),
            output: OutputMode::Stream,
            argv0: None,
        }
    }
}

/// Spawn `bin` with `args`, block until it exits, and return its exit code.
///
/// # Errors
/// * An empty `args` list is a precondition violation and is rejected as
///   [`FetchbinError::InvalidConfig`] before any spawn attempt.
/// * Spawn/wait failures surface as [`FetchbinError::FileSystem`].
///
/// Signal-terminated children (Unix) map to the conventional `128 + signal`
/// exit code; other codeless exits map to `-1`.
pub fn run_tool(bin: &Path, args: &[String], settings: &RunSettings) -> FetchbinResult<i32> {
    if args.is_empty() {
        return Err(FetchbinError::InvalidConfig {
            field: "args",
            reason: "argument list cannot be empty".into(),
        });
    }

    let mut cmd = Command::new(bin);
    cmd.args(args);
    if let Some(cwd) = &settings.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(&settings.env);
    #[cfg(unix)]
    if let Some(argv0) = &settings.argv0 {
        use std::os::unix::process::CommandExt;
        cmd.arg0(argv0);
    }

    crate::trace!("Running {cmd:?}");
    let status = match settings.output {
        OutputMode::Inherit => cmd
            .status()
            .map_err(|e| FetchbinError::file_system("spawn tool process", bin, e))?,
        OutputMode::Stream => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            let mut child = cmd
                .spawn()
                .map_err(|e| FetchbinError::file_system("spawn tool process", bin, e))?;

            let stdout = child.stdout.take().expect("stdout piped above");
            let stderr = child.stderr.take().expect("stderr piped above");

            // stderr is drained on a companion thread so neither pipe can
            // fill up and stall the child.
            let stderr_thread = std::thread::spawn(move || forward_lines(stderr));
            forward_lines(stdout);
            let _ = stderr_thread.join();

            child
                .wait()
                .map_err(|e| FetchbinError::file_system("wait for tool process", bin, e))?
        }
    };

    Ok(exit_code(status))
}

/// Forward each line to the parent's stdout as soon as it arrives.
fn forward_lines(reader: impl std::io::Read) {
    for line in BufReader::new(reader).lines() {
        let Ok(line) = line else { break };
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Task-facing wrapper: resolve `profile_name`, install if missing, then
/// run with the profile's baseline arguments followed by `extra_args`.
///
/// The existence check and the install are two sequential, non-atomic
/// steps; concurrent invocations against the same cache root can race.
pub fn install_and_run(
    spec: &ToolSpec,
    profile_name: &str,
    extra_args: &[String],
) -> FetchbinResult<i32> {
    let profile = spec.profile(profile_name)?;
    let outcome = ensure_installed(spec)?;

    let mut args = profile.args.clone();
    args.extend(extra_args.iter().cloned());

    let settings = RunSettings::from_profile(&profile);
    run_tool(&outcome.bin_path, &args, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh() -> &'static Path {
        Path::new("/bin/sh")
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_args_fail_before_spawning() {
        // A nonexistent binary proves no spawn was attempted: the error is
        // the precondition violation, not a spawn failure.
        let err = run_tool(
            Path::new("/definitely/not/a/binary"),
            &[],
            &RunSettings::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, FetchbinError::InvalidConfig { field: "args", .. }),
            "unexpected error: {err}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn exit_codes_are_propagated() {
        let code = run_tool(sh(), &args(&["-c", "exit 3"]), &RunSettings::default()).unwrap();
        assert_eq!(code, 3);

        let code = run_tool(sh(), &args(&["-c", "exit 0"]), &RunSettings::default()).unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn signal_death_maps_to_128_plus_signal() {
        let code = run_tool(sh(), &args(&["-c", "kill -TERM $$"]), &RunSettings::default()).unwrap();
        assert_eq!(code, 128 + 15);
    }

    #[cfg(unix)]
    #[test]
    fn env_overlay_merges_and_cwd_applies() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("marker"), b"").unwrap();

        let settings = RunSettings::builder()
            .cwd(tmp.path())
            .env(BTreeMap::from([("FETCHBIN_TEST_FLAG".into(), "yes".into())]))
            .build();

        // The script exits 0 only when the overlay variable is visible, the
        // parent environment (PATH) survived the merge, and the working
        // directory actually changed.
        let script = r#"test "$FETCHBIN_TEST_FLAG" = yes && test -n "$PATH" && test -e marker"#;
        let code = run_tool(sh(), &args(&["-c", script]), &settings).unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn missing_binary_is_a_spawn_error() {
        let err = run_tool(
            Path::new("/definitely/not/a/binary"),
            &args(&["--help"]),
            &RunSettings::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, FetchbinError::FileSystem { .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn unknown_profile_fails_before_install() {
        // An unreachable release host would fail the install step; the
        // profile error must fire first.
        let spec = ToolSpec::builder()
            .name("demo")
            .version("v1")
            .owner("acme")
            .repo("demo")
            .release_host("http://127.0.0.1:1")
            .build()
            .unwrap();

        let err = install_and_run(&spec, "deploy", &[]).unwrap_err();
        assert!(matches!(err, FetchbinError::UnknownProfile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn install_and_run_composes_profile_and_trailing_args() {
        // A custom bin path keeps the whole flow offline.
        let spec = ToolSpec::builder()
            .name("sh")
            .version("v1")
            .owner("acme")
            .repo("sh")
            .custom_bin_path("/bin/sh")
            .profile(
                "exit-with",
                Profile {
                    cwd: None,
                    env: Default::default(),
                    args: args(&["-c"]),
                },
            )
            .build()
            .unwrap();

        let code = install_and_run(&spec, "exit-with", &args(&["exit 7"])).unwrap();
        assert_eq!(code, 7);

        // The synthesised default profile contributes no baseline args.
        let code = install_and_run(&spec, "default", &args(&["-c", "exit 1"])).unwrap();
        assert_eq!(code, 1);
    }
}
