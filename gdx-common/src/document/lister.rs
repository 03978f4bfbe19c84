//! Document directory listing
//!
//! Non-recursive: only files directly inside the directory are returned.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Document file extension (matched case-insensitively)
pub const DOCUMENT_EXTENSION: &str = "md";

/// Editor lock and temp file name prefixes
const TEMP_PREFIXES: &[&str] = &["~$", ".~lock.", ".#"];

/// Directory listing errors
#[derive(Debug, Error)]
pub enum ListError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory could not be read
    #[error("Cannot read directory {0}: {1}")]
    Io(PathBuf, String),
}

/// List document files directly inside `dir`, sorted by file name
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, ListError> {
    if !dir.exists() {
        return Err(ListError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ListError::NotADirectory(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    let mut documents = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if is_document(&entry) => documents.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                // The root itself failing to open is fatal; a single bad entry is not
                if e.depth() == 0 {
                    return Err(ListError::Io(dir.to_path_buf(), e.to_string()));
                }
                tracing::warn!("Error accessing entry in {}: {}", dir.display(), e);
            }
        }
    }

    tracing::debug!("Found {} documents in {}", documents.len(), dir.display());
    Ok(documents)
}

fn is_document(entry: &DirEntry) -> bool {
    if !entry.file_type().is_file() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if TEMP_PREFIXES.iter().any(|p| name.starts_with(p)) || name.ends_with('~') {
        return false;
    }
    entry
        .path()
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}
