//! Per-record progress counter
//!
//! With `--verbose Y` the count is redrawn in place on standard output;
//! otherwise the counter is hidden but still counts.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct RecordCounter {
    bar: ProgressBar,
}

impl RecordCounter {
    /// Create a counter, drawn only when `visible`
    pub fn new(visible: bool, message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if visible {
            bar.set_draw_target(ProgressDrawTarget::stdout());
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}: {human_pos} records [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self::new(false, "")
    }

    /// Start counting a new input under `message`
    pub fn restart(&self, message: &str) {
        self.bar.set_position(0);
        self.bar.set_message(message.to_string());
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}
