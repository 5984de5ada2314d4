//! Temporary output file management.
//!
//! Encodes write into a hidden file next to their final destination and are
//! renamed into place only when ffmpeg succeeds. The file is created through
//! the tempfile crate, so an abandoned encode removes it on drop.

use crate::error::{CoreError, CoreResult};
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, TempPath};

const STAGING_PREFIX: &str = ".reframe-";

/// Creates an empty staging file for `final_path` in the same directory.
///
/// The name is `.reframe-{random}.{ext}` whatever the length of the final
/// name, so it stays within the filesystem's name limit. The extension is
/// kept because ffmpeg picks the container from it.
pub fn create_staging_file(final_path: &Path) -> CoreResult<TempPath> {
    let dir = final_path.parent().ok_or_else(|| {
        CoreError::PathError(format!("Output path has no parent: {}", final_path.display()))
    })?;
    let suffix = final_path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = TempFileBuilder::new()
        .prefix(STAGING_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)?;

    Ok(file.into_temp_path())
}

/// Renames the staging file onto `final_path`, replacing any previous output.
pub fn commit_staging_file(staging: TempPath, final_path: &Path) -> CoreResult<()> {
    staging.persist(final_path).map_err(|e| CoreError::Io(e.error))
}
