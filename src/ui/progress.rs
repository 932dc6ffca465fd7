//! Progress reporting for long-running commands.

use indicatif::{ProgressBar, ProgressStyle};

/// Typed progress events for UI rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Move the bar forward by one step, showing `text` next to it
    Step { text: String },
    /// A permanent line printed above the bar
    Line { text: String },
}

/// Progress bar that stays silent in JSON mode
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total: u64, json_output: bool) -> Self {
        let bar = if json_output {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}") {
            bar.set_style(style.progress_chars("█▓░"));
        }
        Self { bar }
    }

    pub fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Step { text } => {
                self.bar.set_message(text);
                self.bar.inc(1);
            }
            ProgressEvent::Line { text } => self.bar.println(text),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}
