use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::GlobalFlags;

/// Optional progress bar on stderr. Disabled for JSON output, quiet mode,
/// and non-terminal stderr.
pub struct Progress {
    bar: Option<ProgressBar>,
}

fn bar_template() -> &'static str {
    match std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
    {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

fn enabled(flags: &GlobalFlags) -> bool {
    flags.shows_progress() && std::io::stderr().is_terminal()
}

impl Progress {
    #[must_use]
    pub fn bar(flags: &GlobalFlags, total: usize, message: &str) -> Self {
        if !enabled(flags) {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    #[must_use]
    pub fn spinner(flags: &GlobalFlags, message: &str) -> Self {
        if !enabled(flags) {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    /// Advance by one finished item, showing its path.
    pub fn tick(&self, path: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(path.to_string());
            bar.inc(1);
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
