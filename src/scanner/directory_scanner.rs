use crate::error::{Result, Zip2PdfError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One direct child of a working directory.
#[derive(Debug, Clone)]
pub struct ScannedEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    pub is_file: bool,
}

impl ScannedEntry {
    pub fn new(path: PathBuf, is_file: bool) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            file_name,
            stem,
            is_file,
        }
    }

    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.file_name.ends_with(suffix)
    }
}

/// Result of listing a directory: the entries plus anything that could not be read.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    pub entries: Vec<ScannedEntry>,
    pub warnings: Vec<String>,
}

impl DirectoryListing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Lists the direct children of `root`, sorted by file name.
    pub fn list_entries<P: AsRef<Path>>(root: P) -> Result<DirectoryListing> {
        let root_path = root.as_ref();
        Self::ensure_directory(root_path)?;

        let mut listing = DirectoryListing::default();

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    // Symlinks count as files when they point at one
                    let is_file = entry.file_type().is_file()
                        || (entry.path_is_symlink() && entry.path().is_file());
                    listing
                        .entries
                        .push(ScannedEntry::new(entry.into_path(), is_file));
                }
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        listing.warnings.push(format!("Permission denied: {}", err));
                    } else {
                        listing.warnings.push(format!("Scan error: {}", err));
                    }
                }
            }
        }

        tracing::debug!(
            dir = %root_path.display(),
            entries = listing.entries.len(),
            warnings = listing.warnings.len(),
            "listed directory"
        );

        Ok(listing)
    }

    pub fn ensure_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Zip2PdfError::InvalidPath {
                path: format!("{} does not exist", path.display()),
            });
        }

        if !path.is_dir() {
            return Err(Zip2PdfError::InvalidPath {
                path: format!("{} is not a directory", path.display()),
            });
        }

        Ok(())
    }

    /// Creates `path` (and parents) when missing; fails if it exists as a file.
    pub fn prepare_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| Zip2PdfError::InvalidPath {
                path: format!("Cannot create directory {}: {}", path.display(), e),
            })?;
        }

        Self::ensure_directory(path)
    }
}
