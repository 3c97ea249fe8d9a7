//! Terminal status line for the watch loop.
//!
//! One spinner line, redrawn every poll tick, mirroring the debounce phase.
//! The composition helpers are plain functions so the wording can be tested
//! without a terminal.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use settle_watcher::Phase;

/// The live status line. Hidden automatically when stderr is not a terminal.
pub struct StatusLine {
    bar: ProgressBar,
    frame: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .expect("valid spinner template"),
        );
        bar.set_message(message(Phase::Waiting, false, 0));
        Self { bar, frame: 0 }
    }

    /// Redraw the line for the current tick.
    pub fn render(&mut self, phase: Phase, triggered: bool) {
        self.frame = self.frame.wrapping_add(1);
        self.bar.set_message(message(phase, triggered, self.frame));
        self.bar.tick();
    }

    /// Clear the line, run `f` with the terminal free, then redraw.
    ///
    /// The action's inherited stdout/stderr would otherwise interleave with
    /// the spinner's redraws.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    /// Remove the line for good.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Status text for one tick.
fn message(phase: Phase, triggered: bool, frame: usize) -> String {
    let status = match phase {
        Phase::Waiting => format!("waiting for changes{}", dots(frame)),
        Phase::Settling(quiet) => {
            format!("change detected, quiet for {:.1}s", quiet.as_secs_f64())
        }
        Phase::Ready(quiet) => format!("settled after {:.1}s of quiet", quiet.as_secs_f64()),
    };
    let last_run = if triggered { "yes" } else { "no" };
    format!("{status} | last run: {last_run}")
}

fn dots(frame: usize) -> &'static str {
    match frame % 3 {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

/// Announcement printed when a settled burst fires.
pub fn fire_banner(quiet: Duration) -> String {
    format!(
        "{} after {:.1}s of quiet",
        "Running command".green().bold(),
        quiet.as_secs_f64()
    )
}

/// Announcement printed when the action returns, success or not.
pub fn done_banner() -> String {
    format!("{}", "Command finished".green())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_dots_cycle_every_tick() {
        let one = message(Phase::Waiting, false, 0);
        let two = message(Phase::Waiting, false, 1);
        let three = message(Phase::Waiting, false, 2);
        let wrapped = message(Phase::Waiting, false, 3);

        assert!(one.starts_with("waiting for changes."));
        assert!(two.starts_with("waiting for changes.."));
        assert!(three.starts_with("waiting for changes..."));
        assert_eq!(one, wrapped);
    }

    #[test]
    fn message_reports_whether_the_last_burst_ran() {
        assert!(message(Phase::Waiting, false, 0).ends_with("last run: no"));
        assert!(message(Phase::Waiting, true, 0).ends_with("last run: yes"));
    }

    #[test]
    fn settling_message_shows_quiet_time() {
        let msg = message(Phase::Settling(Duration::from_millis(400)), false, 0);
        assert!(msg.contains("quiet for 0.4s"));
    }

    #[test]
    fn ready_message_shows_quiet_time() {
        let msg = message(Phase::Ready(Duration::from_millis(1200)), true, 0);
        assert!(msg.contains("settled after 1.2s"));
    }

    #[test]
    fn fire_banner_shows_observed_quiet_time() {
        let banner = fire_banner(Duration::from_millis(1500));
        assert!(banner.contains("1.5s of quiet"));
    }
}
