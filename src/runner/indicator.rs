//! Progress indicators rendered while an external command runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Something that can render a spinner for a running command.
///
/// The runner calls [`start`](Indicator::start) once after the child is
/// spawned, [`tick`](Indicator::tick) at a fixed interval while it is alive,
/// and [`finish`](Indicator::finish) once it has exited.
pub trait Indicator: Send + Sync {
    /// A command labelled `label` has started.
    fn start(&self, label: &str);

    /// Render the next glyph of the spinner cycle.
    fn tick(&self, glyph: char);

    /// The command has exited; clear whatever was rendered.
    fn finish(&self);
}

impl<T: Indicator + ?Sized> Indicator for &T {
    fn start(&self, label: &str) {
        (**self).start(label)
    }

    fn tick(&self, glyph: char) {
        (**self).tick(glyph)
    }

    fn finish(&self) {
        (**self).finish()
    }
}

/// Indicator that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentIndicator;

impl Indicator for SilentIndicator {
    fn start(&self, _label: &str) {}

    fn tick(&self, _glyph: char) {}

    fn finish(&self) {}
}

/// Spinner on stderr, drawn with `indicatif`.
///
/// Nothing is drawn when stderr is not a terminal. The line is cleared when
/// the command finishes so only the caller's own status lines remain.
#[derive(Debug, Default)]
pub struct TerminalIndicator {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Indicator for TerminalIndicator {
    fn start(&self, label: &str) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{prefix:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(label.to_string());

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(previous) = guard.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn tick(&self, glyph: char) {
        if let Some(pb) = self.current() {
            pb.set_prefix(glyph.to_string());
        }
    }

    fn finish(&self) {
        if let Some(pb) = self.bar.lock().ok().and_then(|mut guard| guard.take()) {
            pb.finish_and_clear();
        }
    }
}
