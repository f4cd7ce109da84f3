//! Progress reporting for pipeline stages

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Receives stage progress. Passed into the pipeline instead of living in a global.
pub trait Progress: Send + Sync {
    fn start(&self, message: &str);
    fn succeed(&self, message: &str);
    fn fail(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn start(&self, _message: &str) {}
    fn succeed(&self, _message: &str) {}
    fn fail(&self, _message: &str) {}
}

/// Terminal spinner on stderr. Falls back to plain lines when stderr is not a terminal.
#[derive(Default)]
pub struct SpinnerProgress {
    active: Mutex<Option<ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, line: String) {
        let bar = self.active.lock().ok().and_then(|mut guard| guard.take());
        match bar {
            Some(bar) if !bar.is_hidden() => bar.finish_with_message(line),
            Some(bar) => {
                bar.finish_and_clear();
                eprintln!("{line}");
            }
            None => eprintln!("{line}"),
        }
    }
}

impl Progress for SpinnerProgress {
    fn start(&self, message: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut guard) = self.active.lock() {
            if let Some(previous) = guard.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn succeed(&self, message: &str) {
        self.finish(format!("{} {message}", style("✔").green()));
    }

    fn fail(&self, message: &str) {
        self.finish(format!("{} {message}", style("✖").red()));
    }
}
