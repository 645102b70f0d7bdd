//! CLI console utilities

use automate_core::{AutomationStatus, RunOutcome};
use colored::*;

/// Console for human-facing output; logs go through tracing
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    pub fn print_table_row(&self, cells: &[&str]) {
        let row_line = cells
            .iter()
            .map(|c| format!("{:18}", c))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{row_line}");
    }

    /// Summarise how a run ended
    pub fn print_outcome(&self, outcome: &RunOutcome) {
        let message = outcome.status_message.as_deref().unwrap_or_default();
        let line = format!("{}: {}", outcome.status, message);
        match outcome.status {
            AutomationStatus::Succeeded => self.success(&line),
            AutomationStatus::Failed | AutomationStatus::Exception => self.error(&line),
            _ => self.warn(&line),
        }
        if !outcome.reported {
            self.warn("Final status was not reported to the server");
        }
    }
}
