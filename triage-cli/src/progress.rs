use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use triage_survey::BatchEntry;

/// Progress bar for `triage batch`, drawn on stderr.
pub struct BatchProgress {
    bar: ProgressBar,
    failed: u64,
}

impl BatchProgress {
    /// A bar over `total` issues. Hidden bars track counts without drawing.
    pub fn new(total: u64, visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(
            Some(total),
            if visible {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} issues ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");
        bar.set_style(style);
        bar.set_message("analyzing");

        Self { bar, failed: 0 }
    }

    /// Record one finished entry.
    pub fn record(&mut self, entry: &BatchEntry) {
        if entry.is_success() {
            self.bar.set_message(format!("#{} done", entry.number()));
        } else {
            self.failed += 1;
            self.bar.set_message(format!("#{} failed", entry.number()));
        }
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
