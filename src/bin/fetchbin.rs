//! fetchbin CLI — pinned prebuilt tools for your build tasks
//! ==================================================
//!
//! A thin command-line wrapper around the `fetchbin` library that
//! **downloads, runs, inspects, and removes** cached copies of a pinned
//! external CLI tool (esbuild, tailwindcss, …).
//!
//! ---
//! ## Quick start
//! Install esbuild 0.21.5 into the default cache root and bundle:
//! ```bash
//! fetchbin --name esbuild --version-tag 0.21.5 --owner evanw --repo esbuild \
//!     run -- --bundle src/app.ts
//! ```
//!
//! Or keep the coordinates in a TOML file:
//! ```bash
//! fetchbin --config fetchbin.toml run --profile assets
//! ```
//!
//! ---
//! ## Subcommands
//! | Command       | What it does                                                                    |
//! |---------------|----------------------------------------------------------------------------------|
//! | **install**   | Download and cache the pinned version. `--force` re-downloads unconditionally.  |
//! | **run**       | Install if missing, then run a profile with any trailing arguments appended.    |
//! | **status**    | Report the pinned version, cache location, and the installed copy's version.    |
//! | **remove**    | Delete the cached files for the pinned version.                                 |
//!
//! (Add `--help` after any subcommand to see all flags.)
//!
//! ---
//! ## Shared *tool* flags
//! | Flag                      | Default            | Purpose                                        |
//! |---------------------------|---------------------|------------------------------------------------|
//! | `--config <PATH>`         | _(none)_            | TOML spec file; flags below override its values. |
//! | `--name <NAME>`           | from config         | Executable name of the tool.                   |
//! | `--version-tag <TAG>`     | from config         | Pinned release tag.                            |
//! | `--owner <OWNER>`         | from config         | Release repository owner.                      |
//! | `--repo <REPO>`           | from config         | Release repository name.                       |
//! | `--release-host <URL>`    | `https://github.com`| Release host, overridable for mirrors.         |
//! | `--root <PATH>`           | platform data dir   | Override the cache root.                       |
//!
//! ---
//! ## Exit codes
//! * `0` — success / up-to-date
//! * `1` — configuration, download, or install error
//! * `2` — argument parsing error (from **clap**)
//! * for `run`, the managed tool's own exit code is passed through
//!

use fetchbin::*;

#[derive(Debug, clap::Parser)]
#[command(name = "fetchbin", version)]
struct Cli {
    /// TOML spec file describing the tool; the flags below override
    /// individual values from it.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Override the cache root that would otherwise live in the
    /// per-user data directory (or `FETCHBIN_INSTALL_DIR`).
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<std::path::PathBuf>,

    #[command(flatten)]
    spec: SpecArgs,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, clap::Args)]
struct SpecArgs {
    /// Executable name of the managed tool, e.g. `esbuild`.
    #[arg(long, global = true)]
    name: Option<String>,

    /// Pinned release tag, e.g. `0.21.5`.
    #[arg(long, global = true, value_name = "TAG")]
    version_tag: Option<String>,

    /// Release repository owner, e.g. `evanw`.
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Release repository name, e.g. `esbuild`.
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Base URL of the release host, overridable for mirrors.
    #[arg(long, global = true, value_name = "URL")]
    release_host: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Download and cache the pinned version (skipped when already present).
    Install {
        /// Re-download and overwrite even when a binary is already cached.
        #[arg(long)]
        force: bool,
    },

    /// Install if missing, then run a profile with trailing arguments.
    Run {
        /// Named profile from the config; `default` needs no configuration.
        #[arg(long, default_value = DEFAULT_PROFILE)]
        profile: String,

        /// Arguments appended after the profile's baseline arguments.
        #[arg(trailing_var_arg = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Report the pinned version, cache location, and installed state.
    Status {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete the cached files for the pinned version.
    Remove,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = <Cli as clap::Parser>::parse();
    match dispatch(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("fetchbin: {e}");
            std::process::exit(1);
        }
    }
}

fn dispatch(cli: &Cli) -> FetchbinResult<i32> {
    let spec = resolve_spec(cli)?;

    match &cli.cmd {
        Cmd::Install { force } => {
            let outcome = if *force {
                install(&spec)?
            } else {
                ensure_installed(&spec)?
            };
            println!("{outcome}");
            Ok(0)
        }

        Cmd::Run { profile, args } => {
            let code = install_and_run(&spec, profile, args)?;
            if code != 0 {
                // Non-zero child exits are reported with the full argument
                // list so failures in CI logs are reproducible by hand.
                let mut full = spec.profile(profile)?.args;
                full.extend(args.iter().cloned());
                eprintln!(
                    "fetchbin: `{} {}` exited with status {code}",
                    spec.name,
                    full.join(" ")
                );
            }
            Ok(code)
        }

        Cmd::Status { json } => {
            let home = ToolHome::resolve(&spec)?;
            let bin_path = home.bin_path();
            let installed = match &spec.custom_bin_path {
                Some(custom) => custom.is_file(),
                None => bin_path.is_file(),
            };
            let reported = match &spec.custom_bin_path {
                Some(custom) => probe_version(custom, &spec.version_flag),
                None => home.installed_version(),
            };
            if *json {
                let report = serde_json::json!({
                    "name": spec.name,
                    "pinned_version": spec.version,
                    "bin_path": spec.custom_bin_path.as_ref().unwrap_or(&bin_path),
                    "installed": installed,
                    "reported_version": reported,
                });
                println!("{}", serde_json::to_string_pretty(&report).expect("report is valid JSON"));
            } else {
                println!("{spec}");
                match (installed, reported) {
                    (true, Some(v)) => println!("Installed: yes (reports {v})"),
                    (true, None) => println!("Installed: yes (version probe failed)"),
                    (false, _) => println!("Installed: no"),
                }
            }
            Ok(0)
        }

        Cmd::Remove => {
            let home = ToolHome::resolve(&spec)?;
            home.remove()?;
            println!("removed: {} {}", spec.name, spec.version);
            Ok(0)
        }
    }
}

/// Merge the optional config file with the command-line overrides into a
/// validated [`ToolSpec`]. Flags win over config values.
fn resolve_spec(cli: &Cli) -> FetchbinResult<ToolSpec> {
    let base = cli.config.as_deref().map(ToolSpec::load).transpose()?;

    let field = |flag: &Option<String>,
                 cfg: Option<String>,
                 name: &'static str|
     -> FetchbinResult<String> {
        flag.clone().or(cfg).ok_or(FetchbinError::InvalidConfig {
            field: name,
            reason: format!("missing; pass --config <PATH> or --{}", name.replace('_', "-")),
        })
    };

    let root = cli
        .root
        .clone()
        .or_else(|| base.as_ref().and_then(|s| s.override_root.clone().map(|d| d.0)));

    ToolSpec::builder()
        .name(field(
            &cli.spec.name,
            base.as_ref().map(|s| s.name.clone()),
            "name",
        )?)
        .version(field(
            &cli.spec.version_tag,
            base.as_ref().map(|s| s.version.clone()),
            "version_tag",
        )?)
        .owner(field(
            &cli.spec.owner,
            base.as_ref().map(|s| s.owner.clone()),
            "owner",
        )?)
        .repo(field(
            &cli.spec.repo,
            base.as_ref().map(|s| s.repo.clone()),
            "repo",
        )?)
        .maybe_release_host(
            cli.spec
                .release_host
                .clone()
                .or_else(|| base.as_ref().map(|s| s.release_host.clone())),
        )
        .maybe_version_flag(base.as_ref().map(|s| s.version_flag.clone()))
        .maybe_custom_bin_path(base.as_ref().and_then(|s| s.custom_bin_path.clone()))
        .maybe_ca_bundle(base.as_ref().and_then(|s| s.ca_bundle.clone()))
        .maybe_override_root(root)?
        .profiles(base.map(|s| s.profiles).unwrap_or_default())
        .build()
}
