//! fetchbin – pinned prebuilt CLI tools, downloaded and run for you
//! ================================================================
//!
//! ## Fully Managed
//! - **Automated Install** – Downloads a pinned release archive, caches the
//!   executable per `name × version`, and reuses it on every later call.
//! - **Supported Platforms** – Linux, macOS, and Windows (x64 / arm64 where
//!   the upstream project publishes archives).
//! - **Multiple Versions** – Each pinned version is cached separately, so
//!   projects on different tool versions never clobber each other.
//!
//! ## Thin By Design
//! - **No supervision** – The tool runs as a plain blocking child process;
//!   its exit status is returned to you unchanged.
//! - **No locking** – Installation is two sequential, non-atomic steps
//!   (check, then install). Concurrent installs against the same cache root
//!   are unsupported; last writer wins. This matches the intended
//!   single-invocation, developer-workstation usage.
//! - **No retries** – A failed download or extraction surfaces immediately
//!   as a typed error; the caller decides whether to try again.
//!
//! ## CLI Tool
//! - **`fetchbin`** – `install`, `run`, `status`, and `remove` subcommands
//!   over the same library API, driven by a TOML [`ToolSpec`] file.
//!
//! ---
//!
//! ```rust,no_run
//! use fetchbin::*;
//!
//! fn main() -> FetchbinResult<()> {
//!     let spec = ToolSpec::builder()
//!         .name("esbuild")
//!         .version("0.21.5")
//!         .owner("evanw")
//!         .repo("esbuild")
//!         .build()?;
//!
//!     // Install only if missing, then run the `default` profile.
//!     let code = install_and_run(&spec, "default", &["--help".to_string()])?;
//!     std::process::exit(code);
//! }
//! ```
//!
//! ---
//!
//! ## How It Works
//!
//! ```text
//! Your build task
//!       │
//!       ├─→ ToolSpec          (explicit config: tool, version, profiles)
//!       │        ↓
//!       ├─→ ensure_installed  (locate → download → extract → publish)
//!       │        ↓
//!       └─→ install_and_run   (spawn, stream combined output, exit code)
//! ```
//!
//! The release URL is always
//! `<release_host>/<owner>/<repo>/releases/download/<version>/<name>-<target>.tar.gz`
//! and the archive is expected to contain `<name>-<target>/<name>`.

#[allow(unused_imports)]
use tracing::{Level, debug, error, info, span, trace, warn};

pub mod error;
pub mod tool;

pub use error::{FetchbinError, FetchbinResult};
pub use tool::{fetch::*, home::*, install::*, paths::*, run::*, spec::*, target::*};
