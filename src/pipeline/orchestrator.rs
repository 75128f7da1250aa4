use crate::config::Config;
use crate::converter::{ConversionSummary, DocumentConverter, PdfRenderer, WkhtmltopdfRenderer};
use crate::error::Result;
use crate::extractor::{ArchiveExtractor, ExtractionSummary};
use crate::pipeline::{FailureKind, ProgressSink, RunDirectories, RunLog, RunOutcome, RunReport, Stage};
use crate::renamer::{DocumentRenamer, NameExtractor, RenameSummary};
use crate::ui::GracefulShutdown;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;

pub const COMPLETION_BANNER: &str = "PDF conversion completed!";

/// Runs extraction, conversion and renaming over three working directories.
pub struct ConversionOrchestrator {
    config: Config,
    renderer: Box<dyn PdfRenderer>,
    shutdown: Option<GracefulShutdown>,
}

#[derive(Default)]
struct StageSummaries {
    extraction: Option<ExtractionSummary>,
    conversion: Option<ConversionSummary>,
    renaming: Option<RenameSummary>,
}

impl ConversionOrchestrator {
    /// Builds an orchestrator that renders with the configured external binary.
    pub fn new(config: Config) -> Self {
        let renderer = WkhtmltopdfRenderer::from_config(&config.renderer);
        Self::with_renderer(config, Box::new(renderer))
    }

    pub fn with_renderer(config: Config, renderer: Box<dyn PdfRenderer>) -> Self {
        Self {
            config,
            renderer,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &dyn PdfRenderer {
        self.renderer.as_ref()
    }

    pub fn run(&self, source_dir: &Path, html_dir: &Path, pdf_dir: &Path, sink: &dyn ProgressSink) -> RunReport {
        self.run_with_log(source_dir, html_dir, pdf_dir, sink, RunLog::new())
    }

    /// Same as [`run`](Self::run) but records into a caller-supplied log,
    /// typically one with a listener that streams entries as they arrive.
    pub fn run_with_log(
        &self,
        source_dir: &Path,
        html_dir: &Path,
        pdf_dir: &Path,
        sink: &dyn ProgressSink,
        mut log: RunLog,
    ) -> RunReport {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let mut summaries = StageSummaries::default();

        tracing::info!(
            source = %source_dir.display(),
            html = %html_dir.display(),
            pdf = %pdf_dir.display(),
            "starting run"
        );

        let outcome = match self.try_run(source_dir, html_dir, pdf_dir, sink, &mut log, &mut summaries) {
            Ok(()) => {
                log.info(Stage::Run, COMPLETION_BANNER);
                RunOutcome::Completed
            }
            Err(e) => {
                tracing::error!(error = %e, "run stopped");
                log.error(Stage::Run, None, format!("Error: {}", e));
                RunOutcome::Failed {
                    kind: FailureKind::from(&e),
                    message: e.to_string(),
                }
            }
        };

        RunReport {
            started_at,
            duration: start_time.elapsed(),
            directories: RunDirectories {
                source: source_dir.to_path_buf(),
                html: html_dir.to_path_buf(),
                pdf: pdf_dir.to_path_buf(),
            },
            extraction: summaries.extraction,
            conversion: summaries.conversion,
            renaming: summaries.renaming,
            outcome,
            log: log.into_entries(),
        }
    }

    fn try_run(
        &self,
        source_dir: &Path,
        html_dir: &Path,
        pdf_dir: &Path,
        sink: &dyn ProgressSink,
        log: &mut RunLog,
        summaries: &mut StageSummaries,
    ) -> Result<()> {
        if let Err(e) = self.renderer.check() {
            log.warning(
                Stage::Run,
                format!("{} renderer is not usable, every conversion will fail: {}", self.renderer.name(), e),
            );
        }

        let mut extractor =
            ArchiveExtractor::new().with_member_suffix(self.config.extraction.member_suffix.clone());
        let mut converter = DocumentConverter::new(self.renderer.as_ref());
        let mut renamer = DocumentRenamer::new(NameExtractor::from_config(&self.config.naming));

        if let Some(ref shutdown) = self.shutdown {
            extractor = extractor.with_shutdown(shutdown);
            converter = converter.with_shutdown(shutdown);
            renamer = renamer.with_shutdown(shutdown);
        }

        let extraction = extractor.extract(source_dir, html_dir, log)?;
        tracing::info!(?extraction, "extract stage finished");
        summaries.extraction = Some(extraction);

        let conversion = converter.convert(html_dir, pdf_dir, sink, log)?;
        tracing::info!(?conversion, "convert stage finished");
        summaries.conversion = Some(conversion);

        let renaming = renamer.rename_all(pdf_dir, html_dir, log)?;
        tracing::info!(?renaming, "rename stage finished");
        summaries.renaming = Some(renaming);

        Ok(())
    }
}
