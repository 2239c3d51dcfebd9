//! Terminal and JSON output

use crate::core::{Priority, Status};
use crate::error::Result;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Renders command results either as human-readable text or as JSON
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{}", message.green());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {message}", "Warning:".yellow().bold());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "Error:".red().bold());
    }

    /// Spinner on stderr; hidden in JSON mode
    #[must_use]
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

pub fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => priority.label().dimmed(),
        Priority::Medium => priority.label().normal(),
        Priority::High => priority.label().yellow(),
        Priority::Critical => priority.label().red().bold(),
    }
}

pub fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Open => status.label().cyan(),
        Status::InProgress => status.label().yellow(),
        Status::Resolved => status.label().green(),
        Status::Closed => status.label().dimmed(),
    }
}
