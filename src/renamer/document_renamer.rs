use crate::error::Result;
use crate::pipeline::{RunLog, Stage};
use crate::renamer::NameExtractor;
use crate::scanner::{DirectoryScanner, ScannedEntry};
use crate::ui::GracefulShutdown;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSummary {
    pub total: usize,
    pub renamed: usize,
    pub failed: usize,
    /// Renames that replaced an existing PDF of the same name.
    pub overwritten: usize,
}

/// Renames each PDF after the display name found in its sibling HTML.
pub struct DocumentRenamer<'a> {
    extractor: NameExtractor,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> DocumentRenamer<'a> {
    pub fn new(extractor: NameExtractor) -> Self {
        Self {
            extractor,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn rename_all(&self, pdf_dir: &Path, html_dir: &Path, log: &mut RunLog) -> Result<RenameSummary> {
        // Taken once up front so renamed files are never revisited
        let listing = DirectoryScanner::list_entries(pdf_dir)?;
        let pdfs: Vec<&ScannedEntry> = listing
            .entries
            .iter()
            .filter(|entry| entry.has_suffix(".pdf"))
            .collect();

        for warning in &listing.warnings {
            log.warning(Stage::Rename, warning.clone());
        }

        let mut summary = RenameSummary {
            total: pdfs.len(),
            ..Default::default()
        };

        for pdf in pdfs {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            match self.rename_one(pdf, pdf_dir, html_dir) {
                Ok(outcome) => {
                    summary.renamed += 1;
                    if outcome.overwritten {
                        summary.overwritten += 1;
                    }
                    log.success(
                        Stage::Rename,
                        &pdf.file_name,
                        format!("Renamed {} to {}", pdf.file_name, outcome.new_name),
                    );
                }
                Err(e) => {
                    tracing::warn!(pdf = %pdf.file_name, error = %e, "rename failed");
                    summary.failed += 1;
                    log.error(
                        Stage::Rename,
                        Some(&pdf.file_name),
                        format!("error renaming {}: {}", pdf.file_name, e),
                    );
                }
            }
        }

        Ok(summary)
    }

    fn rename_one(&self, pdf: &ScannedEntry, pdf_dir: &Path, html_dir: &Path) -> Result<RenameOutcome> {
        let html_path = sibling_html_path(html_dir, pdf);
        let display_name = self.extractor.extract_display_name(&html_path)?;

        let new_name = format!("{}.pdf", sanitize_filename(&display_name));
        let target = pdf_dir.join(&new_name);

        if target == pdf.path {
            tracing::debug!(pdf = %pdf.file_name, "already carries its display name");
            return Ok(RenameOutcome {
                new_name,
                overwritten: false,
            });
        }

        let overwritten = target.exists();
        if overwritten {
            tracing::info!(target = %target.display(), "replacing existing PDF");
            fs::remove_file(&target)?;
        }

        fs::rename(&pdf.path, &target)?;

        Ok(RenameOutcome {
            new_name,
            overwritten,
        })
    }
}

struct RenameOutcome {
    new_name: String,
    overwritten: bool,
}

/// `html_dir/<stem>.html` for a PDF.
pub fn sibling_html_path(html_dir: &Path, pdf: &ScannedEntry) -> PathBuf {
    html_dir.join(format!("{}.html", pdf.stem))
}

/// Replaces characters that are not allowed in file names.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::new();

    for ch in name.chars() {
        match ch {
            // Windows/Unix reserved characters
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            '/' | '\\' => sanitized.push('_'),
            c if c.is_control() => sanitized.push('_'),
            c => sanitized.push(c),
        }
    }

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}
