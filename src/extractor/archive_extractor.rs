use crate::error::{Result, Zip2PdfError};
use crate::pipeline::{RunLog, Stage};
use crate::scanner::{DirectoryScanner, ScannedEntry};
use crate::ui::GracefulShutdown;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub containers_found: usize,
    pub containers_processed: usize,
    pub containers_failed: usize,
    pub members_extracted: usize,
    pub containers_deleted: usize,
    pub deletion_failures: usize,
}

/// Pulls HTML members out of the archives in a source directory and removes
/// every archive that was fully processed.
pub struct ArchiveExtractor<'a> {
    member_suffix: String,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> ArchiveExtractor<'a> {
    pub fn new() -> Self {
        Self {
            member_suffix: ".html".to_string(),
            shutdown: None,
        }
    }

    pub fn with_member_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.member_suffix = suffix.into();
        self
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn extract(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        log: &mut RunLog,
    ) -> Result<ExtractionSummary> {
        let listing = DirectoryScanner::list_entries(source_dir)?;
        DirectoryScanner::prepare_directory(target_dir)?;

        for warning in &listing.warnings {
            log.warning(Stage::Extract, warning.clone());
        }

        let mut summary = ExtractionSummary {
            containers_found: listing.len(),
            ..Default::default()
        };
        let mut processed: Vec<&ScannedEntry> = Vec::new();

        for container in &listing.entries {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            match self.extract_container(&container.path, target_dir) {
                Ok(members) => {
                    tracing::debug!(archive = %container.file_name, members, "archive extracted");
                    summary.containers_processed += 1;
                    summary.members_extracted += members;
                    processed.push(container);
                }
                Err(e) => {
                    tracing::warn!(archive = %container.file_name, error = %e, "archive skipped");
                    summary.containers_failed += 1;
                    log.error(
                        Stage::Extract,
                        Some(&container.file_name),
                        format!("error processing {}: {}", container.file_name, e),
                    );
                }
            }
        }

        Self::remove_processed(&processed, &mut summary, log);

        log.info(Stage::Extract, "Extraction complete!");
        Ok(summary)
    }

    /// Extracts every matching member; returns how many were written.
    fn extract_container(&self, archive_path: &Path, target_dir: &Path) -> Result<usize> {
        let archive_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| archive_path.display().to_string());

        let file = fs::File::open(archive_path)?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| Zip2PdfError::archive(&archive_name, e))?;

        let mut extracted = 0;

        for index in 0..archive.len() {
            let mut member = archive
                .by_index(index)
                .map_err(|e| Zip2PdfError::archive(&archive_name, e))?;

            if member.is_dir() || !member.name().ends_with(self.member_suffix.as_str()) {
                continue;
            }

            let dest_path = member_destination(target_dir, member.name())?;

            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let dest_file = fs::File::create(&dest_path)?;
            let mut writer = BufWriter::new(dest_file);
            std::io::copy(&mut member, &mut writer)?;
            writer.flush()?;

            extracted += 1;
        }

        Ok(extracted)
    }

    fn remove_processed(processed: &[&ScannedEntry], summary: &mut ExtractionSummary, log: &mut RunLog) {
        for container in processed {
            match fs::remove_file(&container.path) {
                Ok(()) => summary.containers_deleted += 1,
                Err(e) => {
                    summary.deletion_failures += 1;
                    log.error(
                        Stage::Extract,
                        Some(&container.file_name),
                        format!("error deleting {}: {}", container.file_name, e),
                    );
                }
            }
        }
    }
}

impl Default for ArchiveExtractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins a member's in-archive path onto `target_dir`, refusing anything that
/// would land outside it.
fn member_destination(target_dir: &Path, member_name: &str) -> Result<PathBuf> {
    let relative = Path::new(member_name);

    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if escapes {
        return Err(Zip2PdfError::InvalidPath {
            path: format!("Archive member escapes the target directory: {}", member_name),
        });
    }

    Ok(target_dir.join(relative))
}
