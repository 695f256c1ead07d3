//! Terminal progress lines for archive and transfer steps.
//!
//! Every job owns its own line inside a shared `MultiProgress`, so concurrent
//! downloads redraw independently instead of fighting over one status line.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Format a byte count for display, e.g. `1.17 MiB`.
pub fn human_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Text of an in-flight status line.
pub fn status_text(label: &str, loaded: u64, total: u64) -> String {
    format!("{} {}/{}", label, human_size(loaded), human_size(total))
}

/// Owner of all progress lines for one invocation.
#[derive(Clone)]
pub struct ProgressReporter {
    multi: MultiProgress,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Draw to stdout.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stdout()),
        }
    }

    /// Draw nothing. Lines still track their state.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Start a new line for `label`.
    pub fn line(&self, label: impl Into<String>) -> TransferLine {
        let label = label.into();
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(ProgressStyle::with_template("{msg}").expect("static template"));
        bar.set_message(label.clone());
        TransferLine { label, bar }
    }
}

/// One status line, redrawn in place until completed.
#[derive(Clone)]
pub struct TransferLine {
    label: String,
    bar: ProgressBar,
}

impl TransferLine {
    /// Replace the line with `"{label} {loaded}/{total}"`.
    pub fn report(&self, loaded: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(loaded);
        self.bar.set_message(status_text(&self.label, loaded, total));
    }

    /// Leave a final `"{label} done"` line.
    pub fn complete(&self) {
        self.bar.finish_with_message(format!("{} done", self.label));
    }

    /// Drop the line without a completion message, used when a job fails.
    pub fn abandon(&self) {
        self.bar.abandon_with_message(format!("{} failed", self.label));
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    /// `report` as a progress listener for the store and archive codec.
    pub fn listener(&self) -> impl Fn(u64, u64) + Send + Sync + '_ {
        move |loaded, total| self.report(loaded, total)
    }
}
