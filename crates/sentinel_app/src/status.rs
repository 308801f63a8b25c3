//! Status line rendering.

use std::io::{self, Write};

use chrono::Local;
use colored::{ColoredString, Colorize};
use sentinel_core::{AppViewModel, MonitorState, StatusLine, StatusTone};

/// Receives the view after every status change.
pub trait StatusSink {
    fn show(&mut self, view: &AppViewModel);
}

/// Prints one timestamped, colored line per status change to stderr, followed
/// by the monitor's running totals.
#[derive(Debug, Default)]
pub struct TerminalStatus;

impl TerminalStatus {
    pub fn new() -> Self {
        Self
    }
}

impl StatusSink for TerminalStatus {
    fn show(&mut self, view: &AppViewModel) {
        let stamp = Local::now().format("%H:%M:%S");
        let details = details(view);
        let mut err = io::stderr().lock();
        let _ = if details.is_empty() {
            writeln!(err, "[{stamp}] {}", paint(&view.status))
        } else {
            writeln!(
                err,
                "[{stamp}] {}  {}",
                paint(&view.status),
                format!("({details})").dimmed()
            )
        };
    }
}

fn details(view: &AppViewModel) -> String {
    let mut parts = Vec::new();
    if view.monitor == MonitorState::Running {
        parts.push(format!("every {}", interval(view.period_secs)));
    }
    if view.in_flight > 0 {
        parts.push(format!("{} in flight", view.in_flight));
    }
    if view.cycles_completed > 0 {
        parts.push(format!("checks {}", view.cycles_completed));
    }
    if let Some(total) = view.last_total {
        parts.push(format!("published {total}"));
    }
    if !view.last_new_items.is_empty() {
        parts.push(format!("latest: {}", view.last_new_items.join(", ")));
    }
    parts.join(" | ")
}

fn interval(secs: u64) -> String {
    match (secs / 60, secs % 60) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}

fn marker(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Idle => "-",
        StatusTone::Busy => "~",
        StatusTone::Normal => "*",
        StatusTone::Alert => "!",
        StatusTone::Warning => "?",
        StatusTone::Error => "x",
    }
}

fn paint(status: &StatusLine) -> ColoredString {
    let line = format!("{} {}", marker(status.tone), status.text);
    match status.tone {
        StatusTone::Idle => line.dimmed(),
        StatusTone::Busy => line.yellow(),
        StatusTone::Normal => line.green(),
        StatusTone::Alert => line.bright_magenta().bold(),
        StatusTone::Warning => line.truecolor(255, 165, 0),
        StatusTone::Error => line.red().bold(),
    }
}
