pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod renamer;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat, RunPaths};
pub use config::{CliOverrides, Config, DirectoryConfig, ExtractionConfig, NamingConfig, RendererConfig};
pub use error::{Result, UserFriendlyError, Zip2PdfError};

// Core functionality re-exports
pub use converter::{ConversionSummary, DocumentConverter, PdfRenderer, WkhtmltopdfRenderer};
pub use extractor::{ArchiveExtractor, ExtractionSummary};
pub use pipeline::{
    ConversionOrchestrator, FailureKind, LogEntry, LogLevel, NoopProgressSink, ProgressSink, RunLog,
    RunOutcome, RunReport, Stage,
};
pub use renamer::{DocumentRenamer, NameExtractor, NameWindow, RenameSummary};
pub use scanner::{DirectoryListing, DirectoryScanner, ScannedEntry};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tokio::task;

/// Main library interface for the archive-to-PDF pipeline
pub struct Zip2Pdf {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Zip2Pdf {
    /// Create a new instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode != OutputMode::Json);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance for testing (no signal handler conflicts)
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Run extract, convert and rename over `paths`.
    ///
    /// Transcript lines are printed as they are recorded (except in JSON
    /// mode, which prints the whole report at the end). The pipeline itself
    /// is synchronous and runs on a blocking task.
    pub async fn convert(&self, paths: &RunPaths) -> Result<RunReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Converting archives to PDF");

        let progress = self.progress_manager.create_conversion_progress();

        let config = self.config.clone();
        let shutdown = self.shutdown.clone();
        let paths = paths.clone();
        let sink = progress.clone();
        let formatter = self.output_formatter.clone();
        let printer = self.progress_manager.clone();

        let report = task::spawn_blocking(move || {
            let log = if formatter.mode() == OutputMode::Json {
                RunLog::new()
            } else {
                RunLog::new().with_listener(move |entry| {
                    printer.suspend(|| formatter.print_log_entry(entry));
                })
            };

            ConversionOrchestrator::new(config)
                .with_shutdown(shutdown)
                .run_with_log(&paths.source, &paths.html, &paths.pdf, &sink, log)
        })
        .await
        .map_err(|e| Zip2PdfError::Config {
            message: format!("Conversion task failed: {}", e),
        })?;

        match report.outcome {
            RunOutcome::Completed => progress.finish_with_summary("Conversion finished"),
            RunOutcome::Failed { .. } => progress.abandon_with_message("Conversion stopped"),
        }

        Ok(report)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &Zip2PdfError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        let result = Zip2Pdf::generate_sample_config(&config_path);
        assert!(result.is_ok());
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[directories]"));
        assert!(content.contains("[renderer]"));
        assert!(content.contains("[naming]"));

        let parsed = Config::load_from_file(&config_path).unwrap();
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_shutdown_handling() {
        let zip2pdf = Zip2Pdf::new_for_test(Config::default(), OutputMode::Human, 0, true);

        assert!(zip2pdf.is_running());

        zip2pdf.request_shutdown();
        assert!(!zip2pdf.is_running());
    }

    #[tokio::test]
    async fn test_convert_missing_source_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RunPaths {
            source: temp_dir.path().join("missing"),
            html: temp_dir.path().join("html"),
            pdf: temp_dir.path().join("pdf"),
        };

        let zip2pdf = Zip2Pdf::new_for_test(Config::default(), OutputMode::Json, 0, true);
        let report = zip2pdf.convert(&paths).await.unwrap();

        assert!(matches!(
            report.outcome,
            RunOutcome::Failed {
                kind: FailureKind::InvalidPath,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_convert_after_shutdown_is_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RunPaths {
            source: temp_dir.path().to_path_buf(),
            html: temp_dir.path().join("html"),
            pdf: temp_dir.path().join("pdf"),
        };

        let zip2pdf = Zip2Pdf::new_for_test(Config::default(), OutputMode::Json, 0, true);
        zip2pdf.request_shutdown();

        assert!(matches!(zip2pdf.convert(&paths).await, Err(Zip2PdfError::Cancelled)));
    }
}
