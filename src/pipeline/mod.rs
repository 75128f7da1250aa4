pub mod orchestrator;
pub mod report;
pub mod run_log;
pub mod sink;

pub use orchestrator::{ConversionOrchestrator, COMPLETION_BANNER};
pub use report::{FailureKind, RunDirectories, RunOutcome, RunReport};
pub use run_log::{LogEntry, LogLevel, RunLog, Stage};
pub use sink::{progress_percentage, NoopProgressSink, ProgressSink};
