use crate::pipeline::ProgressSink;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Clone)]
pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Percentage bar fed by the convert stage.
    pub fn create_conversion_progress(&self) -> ConversionProgressBar {
        if !self.enabled {
            return ConversionProgressBar::new(ProgressBar::hidden());
        }

        let pb = self.multi_progress.add(ProgressBar::new(100));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Extracting archives...");
        pb.enable_steady_tick(Duration::from_millis(100));
        ConversionProgressBar::new(pb)
    }

    /// Runs `f` with the bars hidden so plain output doesn't tear them.
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Terminal bar that displays convert-stage percentages.
#[derive(Clone)]
pub struct ConversionProgressBar {
    bar: ProgressBar,
}

impl ConversionProgressBar {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish_with_summary(&self, message: &str) {
        finish_progress_with_summary(&self.bar, message, self.bar.elapsed());
    }

    pub fn abandon_with_message(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

impl ProgressSink for ConversionProgressBar {
    fn set_progress(&self, percent: u8) {
        if self.bar.position() == 0 {
            self.bar.set_message("Converting documents...");
        }
        self.bar.set_position(u64::from(percent));
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}
