// top-level error for the public API

#[derive(Debug, thiserror::Error)]
pub enum FetchbinError {
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown profile `{name}` (known profiles: {known})")]
    UnknownProfile { name: String, known: String },

    #[error("no prebuilt release archive for {os}/{arch}")]
    UnsupportedPlatform {
        /// `std::env::consts::OS`
        os: &'static str,
        /// `std::env::consts::ARCH`
        arch: &'static str,
    },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("archive extraction failed: {reason}")]
    Archive { reason: String },

    #[error("{operation} failed for '{path}'")]
    FileSystem {
        operation: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type FetchbinResult<T> = std::result::Result<T, FetchbinError>;

impl FetchbinError {
    pub fn file_system(
        operation: &'static str,
        path: impl Into<std::path::PathBuf>,
        err: impl Into<std::io::Error>,
    ) -> Self {
        Self::FileSystem {
            operation,
            path: path.into(),
            source: err.into(),
        }
    }

    pub fn download(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
