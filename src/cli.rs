use crate::config::{CliOverrides, Config};
use crate::error::{Result, Zip2PdfError};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zip2pdf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert zipped HTML exports into PDFs named after their customer")]
#[command(
    long_about = "zip2pdf extracts the HTML document from every archive in a source directory, \
                  renders each one to PDF with wkhtmltopdf and renames the PDF after the party \
                  named in the document's customerPartyTable."
)]
#[command(after_help = "EXAMPLES:\n  \
    zip2pdf zips html pdf --renderer /usr/local/bin/wkhtmltopdf\n  \
    zip2pdf zips html pdf --timeout 60 --report run.json\n  \
    zip2pdf --config zip2pdf.toml\n  \
    zip2pdf --generate-config --config zip2pdf.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory holding the archives to convert
    pub source_dir: Option<PathBuf>,

    /// Working directory for extracted HTML files
    pub html_dir: Option<PathBuf>,

    /// Directory that receives the renamed PDFs
    pub pdf_dir: Option<PathBuf>,

    /// Path to the wkhtmltopdf binary
    #[arg(long, env = "ZIP2PDF_RENDERER")]
    pub renderer: Option<PathBuf>,

    /// Renderer deadline per document in seconds (0 waits forever)
    #[arg(long, help = "Per-document renderer timeout (seconds, 0 = none)")]
    pub timeout: Option<u64>,

    /// Id of the table that holds the party record
    #[arg(long, value_parser = validate_table_id)]
    pub table_id: Option<String>,

    /// Known-good party record used to check the name window at startup
    #[arg(long)]
    pub sample_record: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write the run report to this file (.txt for text, JSON otherwise)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Check directories and renderer without converting anything")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

/// The three working directories of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub source: PathBuf,
    pub html: PathBuf,
    pub pdf: PathBuf,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_directories(
                self.source_dir.clone(),
                self.html_dir.clone(),
                self.pdf_dir.clone(),
            )
            .with_renderer(self.renderer.clone())
            .with_timeout(self.timeout)
            .with_table_id(self.table_id.clone())
            .with_sample_record(self.sample_record.clone())
    }

    /// Directories from the command line, falling back to the configuration file.
    pub fn resolve_paths(config: &Config) -> Result<RunPaths> {
        let missing = |name: &str| Zip2PdfError::Config {
            message: format!(
                "{} was not given on the command line or in [directories]",
                name
            ),
        };

        Ok(RunPaths {
            source: config
                .directories
                .source
                .clone()
                .ok_or_else(|| missing("SOURCE_DIR"))?,
            html: config
                .directories
                .html
                .clone()
                .ok_or_else(|| missing("HTML_DIR"))?,
            pdf: config
                .directories
                .pdf
                .clone()
                .ok_or_else(|| missing("PDF_DIR"))?,
        })
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_table_id(s: &str) -> std::result::Result<String, String> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err("Table id must not be empty".to_string());
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err("Table id cannot contain whitespace".to_string());
    }

    Ok(trimmed.to_string())
}
