//! File discovery module for finding video files to process.
//!
//! Inputs may be files or directories. A file is accepted when its extension
//! (case-insensitive) is one of [`SUPPORTED_EXTENSIONS`]; a directory is
//! scanned for such files, at the top level only unless recursion is enabled.
//! Directories named like the output subdirectory are never entered, so
//! re-running over the same folder does not pick up previous outputs.

use crate::config::SUPPORTED_EXTENSIONS;
use crate::error::{CoreError, CoreResult};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns true when `path` has a supported video extension.
#[must_use]
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Finds the video files to process among `inputs`.
///
/// Results keep the order of `inputs`; files found inside one directory are
/// sorted by path. A file reached twice (listed twice, or listed and also
/// inside a listed directory) is kept at its first position only.
///
/// # Errors
///
/// * `CoreError::PathError` - an input path does not exist
/// * `CoreError::NoFilesFound` - nothing supported was found
///
/// # Examples
///
/// ```rust,no_run
/// use reframe_core::find_processable_files;
/// use std::path::PathBuf;
///
/// let inputs = vec![PathBuf::from("/path/to/videos")];
/// match find_processable_files(&inputs, false, "9x16_output") {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_processable_files(
    inputs: &[PathBuf],
    recursive: bool,
    output_subdir: &str,
) -> CoreResult<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let candidates = if input.is_dir() {
            scan_directory(input, recursive, output_subdir)
        } else if input.is_file() {
            if has_supported_extension(input) {
                vec![input.clone()]
            } else {
                log::warn!("Skipping unsupported file: {}", input.display());
                Vec::new()
            }
        } else {
            return Err(CoreError::PathError(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        };

        for file in candidates {
            let key = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
            if seen.insert(key) {
                files.push(file);
            } else {
                log::debug!("Ignoring duplicate input: {}", file.display());
            }
        }
    }

    if files.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        log::debug!("Discovered {} video file(s)", files.len());
        Ok(files)
    }
}

fn scan_directory(dir: &Path, recursive: bool, output_subdir: &str) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && entry.file_name() == output_subdir))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|path| path.is_file() && has_supported_extension(path))
        .collect();

    files.sort();
    files
}
