use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Convert,
    Rename,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Convert => "convert",
            Stage::Rename => "rename",
            Stage::Run => "run",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub stage: Stage,
    pub level: LogLevel,
    /// File the line is about, when it concerns a single item.
    pub item: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

type Listener = Box<dyn Fn(&LogEntry) + Send>;

/// Ordered transcript of a run. Entries are kept for the final report and,
/// when a listener is installed, streamed to it as they are recorded.
#[derive(Default, Serialize)]
#[serde(transparent)]
pub struct RunLog {
    entries: Vec<LogEntry>,
    #[serde(skip)]
    listener: Option<Listener>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&LogEntry) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn info<S: Into<String>>(&mut self, stage: Stage, message: S) {
        self.record(stage, LogLevel::Info, None, message.into());
    }

    pub fn warning<S: Into<String>>(&mut self, stage: Stage, message: S) {
        self.record(stage, LogLevel::Warning, None, message.into());
    }

    pub fn success<S: Into<String>>(&mut self, stage: Stage, item: &str, message: S) {
        self.record(stage, LogLevel::Success, Some(item.to_string()), message.into());
    }

    pub fn error<S: Into<String>>(&mut self, stage: Stage, item: Option<&str>, message: S) {
        self.record(stage, LogLevel::Error, item.map(str::to_string), message.into());
    }

    fn record(&mut self, stage: Stage, level: LogLevel, item: Option<String>, message: String) {
        let entry = LogEntry {
            stage,
            level,
            item,
            message,
            timestamp: Utc::now(),
        };

        if let Some(ref listener) = self.listener {
            listener(&entry);
        }

        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.level == LogLevel::Error)
    }

    /// Item-level errors, i.e. everything except a top-level run failure.
    pub fn item_error_count(&self) -> usize {
        self.errors().filter(|e| e.stage != Stage::Run).count()
    }

    pub fn errors_for<'a>(&'a self, stage: Stage) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.errors().filter(move |e| e.stage == stage)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

impl fmt::Debug for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLog")
            .field("entries", &self.entries)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_records_in_order() {
        let mut log = RunLog::new();
        log.info(Stage::Extract, "Extraction complete!");
        log.success(Stage::Convert, "a.html", "converted a.html to PDF");
        log.error(Stage::Rename, Some("a.pdf"), "error renaming a.pdf: boom");

        assert_eq!(
            log.lines(),
            vec![
                "Extraction complete!",
                "converted a.html to PDF",
                "error renaming a.pdf: boom",
            ]
        );
        assert_eq!(log.item_error_count(), 1);
        assert_eq!(log.errors_for(Stage::Rename).count(), 1);
        assert_eq!(log.errors_for(Stage::Convert).count(), 0);
    }

    #[test]
    fn test_run_errors_are_not_item_errors() {
        let mut log = RunLog::new();
        log.error(Stage::Run, None, "Error: source missing");
        assert_eq!(log.item_error_count(), 0);
        assert_eq!(log.errors().count(), 1);
    }

    #[test]
    fn test_listener_sees_every_entry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut log = RunLog::new().with_listener(move |entry| {
            sink.lock().unwrap().push(entry.message.clone());
        });
        log.info(Stage::Run, "one");
        log.warning(Stage::Convert, "two");

        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_serializes_as_entry_list() {
        let mut log = RunLog::new();
        log.success(Stage::Rename, "cust1.pdf", "Renamed cust1.pdf to Jack Sparrow.pdf");

        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["stage"], "rename");
        assert_eq!(json[0]["level"], "success");
        assert_eq!(json[0]["item"], "cust1.pdf");
    }
}
