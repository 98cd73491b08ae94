//! Gzip-compressed POSIX tar extraction.
//!
//! Release archives are expected to be `.tar.gz` with a single top-level
//! `<name>-<target>/` directory. Extraction happens entirely in the
//! installer's scratch directory; `tar::Archive::unpack` refuses entries
//! that would escape it.

use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{FetchbinError, FetchbinResult};

/// Extract an in-memory `.tar.gz` into `dest`, preserving Unix permission
/// bits recorded in the archive.
pub fn extract_tar_gz(bytes: &[u8], dest: &Path) -> FetchbinResult<()> {
    std::fs::create_dir_all(dest)
        .map_err(|e| FetchbinError::file_system("create extraction dir", dest, e))?;

    let decoder = GzDecoder::new(bytes);
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.unpack(dest).map_err(|e| FetchbinError::Archive {
        reason: format!("unpacking into {}: {e}", dest.display()),
    })?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};

    /// Build an in-memory `.tar.gz` from `(path, mode, contents)` entries.
    pub(crate) fn tar_gz(entries: &[(&str, u32, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, mode, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, path, *contents).unwrap();
        }

        let mut encoder = builder.into_inner().unwrap();
        encoder.flush().unwrap();
        encoder.finish().unwrap()
    }
}
