use crate::converter::PdfRenderer;
use crate::error::{Result, Zip2PdfError};
use crate::pipeline::{progress_percentage, ProgressSink, RunLog, Stage};
use crate::scanner::{DirectoryScanner, ScannedEntry};
use crate::ui::GracefulShutdown;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
}

/// Renders every entry of the HTML directory into the PDF directory.
pub struct DocumentConverter<'a> {
    renderer: &'a dyn PdfRenderer,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> DocumentConverter<'a> {
    pub fn new(renderer: &'a dyn PdfRenderer) -> Self {
        Self {
            renderer,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn convert(
        &self,
        html_dir: &Path,
        pdf_dir: &Path,
        sink: &dyn ProgressSink,
        log: &mut RunLog,
    ) -> Result<ConversionSummary> {
        let listing = DirectoryScanner::list_entries(html_dir)?;
        DirectoryScanner::prepare_directory(pdf_dir)?;

        for warning in &listing.warnings {
            log.warning(Stage::Convert, warning.clone());
        }

        let total = listing.len();
        let mut summary = ConversionSummary {
            total,
            ..Default::default()
        };

        if total == 0 {
            sink.set_progress(progress_percentage(0, 0));
            return Ok(summary);
        }

        for (index, entry) in listing.entries.iter().enumerate() {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            match self.convert_one(entry, pdf_dir) {
                Ok(output) => {
                    tracing::debug!(input = %entry.file_name, output = %output.display(), "converted");
                    summary.converted += 1;
                    log.success(
                        Stage::Convert,
                        &entry.file_name,
                        format!("converted {} to PDF", entry.file_name),
                    );
                }
                Err(e) => {
                    tracing::warn!(input = %entry.file_name, error = %e, "conversion failed");
                    summary.failed += 1;
                    log.error(
                        Stage::Convert,
                        Some(&entry.file_name),
                        format!("error converting {} to PDF: {}", entry.file_name, e),
                    );
                }
            }

            sink.set_progress(progress_percentage(index + 1, total));
        }

        Ok(summary)
    }

    fn convert_one(&self, entry: &ScannedEntry, pdf_dir: &Path) -> Result<PathBuf> {
        if !entry.is_file {
            return Err(Zip2PdfError::InvalidPath {
                path: format!("{} is not a regular file", entry.path.display()),
            });
        }

        let output = pdf_output_path(pdf_dir, entry);
        self.renderer.render(&entry.path, &output)?;
        Ok(output)
    }
}

/// `pdf_dir/<stem>.pdf` for an input entry.
pub fn pdf_output_path(pdf_dir: &Path, entry: &ScannedEntry) -> PathBuf {
    pdf_dir.join(format!("{}.pdf", entry.stem))
}
