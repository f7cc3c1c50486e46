//! Console output for batchrun
//!
//! Every line carries a local timestamp and a styled status symbol. Lines are
//! written with a single `println!`/`eprintln!` so output from parallel
//! workers never interleaves mid-line.

use chrono::Local;
use console::{StyledObject, style};

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn stamp() -> StyledObject<String> {
        style(format!("[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"))).dim()
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {} {}", Self::stamp(), style("✔").green(), style(message).green());
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {} {}", Self::stamp(), style("✖").red(), style(message).red());
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {} {}", Self::stamp(), style("⚠").yellow(), style(message).yellow());
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {} {}", Self::stamp(), style("ℹ").blue(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {} {}", Self::stamp(), style("ℹ").dim(), style(message).dim());
        }
    }

    /// Print a section header with enhanced styling
    pub fn section_header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().cyan());
        }
    }

    /// Print a section separator
    pub fn separator(&self) {
        if !self.quiet {
            println!("{}", style("─".repeat(50)).dim());
        }
    }

    /// Print a key-value pair with consistent styling
    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            println!("  {:<22} {}", style(key).dim(), styled_value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("  {} {}", style("•").yellow(), item);
        }
    }

    /// Print an indented block of captured text, one line at a time
    pub fn indent(&self, message: &str) {
        for line in message.lines() {
            eprintln!("    {}", style(line).dim());
        }
    }

    /// Print a progress indicator with consistent styling
    pub fn progress_indicator(&self, current: usize, total: usize, message: &str) {
        if !self.quiet {
            let percentage = if total > 0 { (current * 100) / total } else { 0 };
            println!(
                "{} {} {} {}% ({}/{})",
                Self::stamp(),
                style("►").cyan(),
                message,
                style(percentage.to_string()).bold(),
                current,
                total
            );
        }
    }

    /// Print a critical error with enhanced styling
    pub fn critical(&self, message: &str) {
        eprintln!(
            "{} {} {}",
            Self::stamp(),
            style("✖").red().bold(),
            style(message).red().bold()
        );
    }
}
