use crate::error::{UserFriendlyError, Zip2PdfError};
use crate::pipeline::{LogEntry, LogLevel, RunOutcome, RunReport};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

#[derive(Clone)]
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Prints one transcript line as it is recorded. Quiet mode keeps errors only.
    pub fn print_log_entry(&self, entry: &LogEntry) {
        if self.quiet && entry.level != LogLevel::Error {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                let msg_type = match entry.level {
                    LogLevel::Info => MessageType::Info,
                    LogLevel::Success => MessageType::Success,
                    LogLevel::Warning => MessageType::Warning,
                    LogLevel::Error => MessageType::Error,
                };
                self.print_human_message(msg_type, &entry.message);
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "log",
                "stage": entry.stage,
                "level": entry.level,
                "item": entry.item,
                "message": entry.message,
                "timestamp": entry.timestamp.to_rfc3339()
            })),
            // Plain mode prints the transcript verbatim
            OutputMode::Plain => println!("{}", entry.message),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &Zip2PdfError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_run_summary(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Human if !self.quiet => self.print_human_summary(report),
            OutputMode::Plain if !self.quiet => self.print_plain_summary(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            _ => {}
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &RunReport) {
        println!();
        self.print_separator();

        match report.outcome {
            RunOutcome::Completed if self.use_colors => {
                println!("{} {}", style("PDF conversion completed!").green().bold(), CHECKMARK)
            }
            RunOutcome::Completed => println!("✓ PDF conversion completed!"),
            RunOutcome::Failed { ref message, .. } if self.use_colors => {
                println!("{} {}", style("PDF conversion stopped:").red().bold(), message)
            }
            RunOutcome::Failed { ref message, .. } => println!("✗ PDF conversion stopped: {}", message),
        }

        println!();
        for (label, value) in summary_rows(report) {
            let value = if self.use_colors {
                style(value).cyan().bold().to_string()
            } else {
                value
            };
            println!("  {:<18} {}", format!("{}:", label), value);
        }

        let item_errors = report.item_errors().count();
        if item_errors > 0 {
            println!("  {:<18} {}", "Errors:", item_errors);
        }

        self.print_separator();
    }

    fn print_plain_summary(&self, report: &RunReport) {
        match report.outcome {
            RunOutcome::Completed => println!("COMPLETED: PDF conversion"),
            RunOutcome::Failed { ref message, .. } => println!("FAILED: {}", message),
        }
        for (label, value) in summary_rows(report) {
            println!("{}: {}", label, value);
        }
        let item_errors = report.item_errors().count();
        if item_errors > 0 {
            println!("Errors: {}", item_errors);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn summary_rows(report: &RunReport) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    if let Some(ref extraction) = report.extraction {
        rows.push((
            "Archives",
            format!(
                "{} extracted, {} failed",
                extraction.containers_processed, extraction.containers_failed
            ),
        ));
        rows.push(("HTML files", extraction.members_extracted.to_string()));
    }
    if let Some(ref conversion) = report.conversion {
        rows.push((
            "PDFs",
            format!("{} of {} converted", conversion.converted, conversion.total),
        ));
    }
    if let Some(ref renaming) = report.renaming {
        rows.push((
            "Renamed",
            format!("{} of {} ({} overwritten)", renaming.renamed, renaming.total, renaming.overwritten),
        ));
    }
    rows.push(("Time taken", format_duration(report.duration)));

    rows
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
