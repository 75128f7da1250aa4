use crate::converter::ConversionSummary;
use crate::error::{Result, Zip2PdfError};
use crate::extractor::ExtractionSummary;
use crate::pipeline::{LogEntry, LogLevel, Stage};
use crate::renamer::RenameSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub directories: RunDirectories,
    pub extraction: Option<ExtractionSummary>,
    pub conversion: Option<ConversionSummary>,
    pub renaming: Option<RenameSummary>,
    pub outcome: RunOutcome,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDirectories {
    pub source: PathBuf,
    pub html: PathBuf,
    pub pdf: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Failed { kind: FailureKind, message: String },
}

/// Coarse class of a top-level failure, enough to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidPath,
    Cancelled,
    Other,
}

impl From<&Zip2PdfError> for FailureKind {
    fn from(error: &Zip2PdfError) -> Self {
        match error {
            Zip2PdfError::InvalidPath { .. } => FailureKind::InvalidPath,
            Zip2PdfError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Other,
        }
    }
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// True when any single item failed, regardless of the overall outcome.
    pub fn has_item_errors(&self) -> bool {
        self.item_errors().next().is_some()
    }

    pub fn item_errors(&self) -> impl Iterator<Item = &LogEntry> {
        self.log
            .iter()
            .filter(|e| e.level == LogLevel::Error && e.stage != Stage::Run)
    }

    pub fn lines(&self) -> Vec<&str> {
        self.log.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| Zip2PdfError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(path.as_ref(), json_content)?;
        Ok(())
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = fs::File::create(path.as_ref())?;

        writeln!(file, "zip2pdf Run Report")?;
        writeln!(file, "==================")?;
        writeln!(file)?;

        writeln!(file, "Started at: {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(file, "Duration: {:?}", self.duration)?;
        match self.outcome {
            RunOutcome::Completed => writeln!(file, "Outcome: completed")?,
            RunOutcome::Failed { ref message, .. } => writeln!(file, "Outcome: failed ({})", message)?,
        }
        writeln!(file)?;

        writeln!(file, "Directories:")?;
        writeln!(file, "  Source: {}", self.directories.source.display())?;
        writeln!(file, "  HTML: {}", self.directories.html.display())?;
        writeln!(file, "  PDF: {}", self.directories.pdf.display())?;
        writeln!(file)?;

        if let Some(ref extraction) = self.extraction {
            writeln!(file, "Extraction:")?;
            writeln!(file, "  Archives found: {}", extraction.containers_found)?;
            writeln!(file, "  Archives processed: {}", extraction.containers_processed)?;
            writeln!(file, "  Archives failed: {}", extraction.containers_failed)?;
            writeln!(file, "  HTML files extracted: {}", extraction.members_extracted)?;
            writeln!(file)?;
        }

        if let Some(ref conversion) = self.conversion {
            writeln!(file, "Conversion:")?;
            writeln!(file, "  Converted: {} of {}", conversion.converted, conversion.total)?;
            writeln!(file, "  Failed: {}", conversion.failed)?;
            writeln!(file)?;
        }

        if let Some(ref renaming) = self.renaming {
            writeln!(file, "Renaming:")?;
            writeln!(file, "  Renamed: {} of {}", renaming.renamed, renaming.total)?;
            writeln!(file, "  Overwritten: {}", renaming.overwritten)?;
            writeln!(file, "  Failed: {}", renaming.failed)?;
            writeln!(file)?;
        }

        writeln!(file, "Transcript:")?;
        for entry in &self.log {
            writeln!(file, "  [{}] {}", entry.stage, entry.message)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunLog;
    use tempfile::TempDir;

    fn sample_report(outcome: RunOutcome, log: RunLog) -> RunReport {
        RunReport {
            started_at: Utc::now(),
            duration: Duration::from_millis(1500),
            directories: RunDirectories {
                source: PathBuf::from("zips"),
                html: PathBuf::from("html"),
                pdf: PathBuf::from("pdf"),
            },
            extraction: Some(ExtractionSummary {
                containers_found: 2,
                containers_processed: 2,
                members_extracted: 2,
                containers_deleted: 2,
                ..Default::default()
            }),
            conversion: Some(ConversionSummary {
                total: 2,
                converted: 1,
                failed: 1,
            }),
            renaming: None,
            outcome,
            log: log.into_entries(),
        }
    }

    #[test]
    fn test_item_errors() {
        let mut log = RunLog::new();
        log.error(Stage::Convert, Some("b.html"), "error converting b.html to PDF: boom");
        let report = sample_report(RunOutcome::Completed, log);

        assert!(report.is_completed());
        assert!(report.has_item_errors());
        assert_eq!(report.item_errors().count(), 1);
    }

    #[test]
    fn test_run_failure_is_not_an_item_error() {
        let mut log = RunLog::new();
        log.error(Stage::Run, None, "Error: Path validation failed: zips");
        let report = sample_report(
            RunOutcome::Failed {
                kind: FailureKind::InvalidPath,
                message: "Path validation failed: zips".to_string(),
            },
            log,
        );

        assert!(!report.is_completed());
        assert!(!report.has_item_errors());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["kind"], "invalid_path");
    }

    #[test]
    fn test_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let mut log = RunLog::new();
        log.info(Stage::Run, "PDF conversion completed!");
        let report = sample_report(RunOutcome::Completed, log);
        report.save_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"]["status"], "completed");
        assert_eq!(value["conversion"]["failed"], 1);
        assert_eq!(value["log"][0]["message"], "PDF conversion completed!");

        let loaded: RunReport = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.directories, report.directories);
    }

    #[test]
    fn test_text_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.txt");

        let mut log = RunLog::new();
        log.success(Stage::Convert, "a.html", "converted a.html to PDF");
        sample_report(RunOutcome::Completed, log).save_text(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Outcome: completed"));
        assert!(content.contains("Converted: 1 of 2"));
        assert!(content.contains("[convert] converted a.html to PDF"));
        assert!(!content.contains("Renaming:"));
    }
}
