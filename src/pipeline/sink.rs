//! Progress reporting for the convert stage.
//!
//! The convert stage reports an integer percentage after every attempted
//! document. Anything that can display or record a number can act as a
//! sink: a terminal progress bar, a channel sender, or a plain closure.

/// Receives percentage updates in `[0, 100]`, non-decreasing within one pass.
pub trait ProgressSink {
    fn set_progress(&self, percent: u8);
}

/// Sink for callers that don't display progress.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn set_progress(&self, _percent: u8) {}
}

impl<F> ProgressSink for F
where
    F: Fn(u8),
{
    fn set_progress(&self, percent: u8) {
        self(percent)
    }
}

/// `round(done / total * 100)`; an empty batch counts as complete.
pub fn progress_percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }

    let percent = (done as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
