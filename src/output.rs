//! Output formatting and styling module.
//!
//! All user-facing terminal output goes through [`OutputFormatter`]. Diagnostic
//! events go through `tracing` instead (see the `logging` module).

use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prints CLI messages with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// OutputFormatter::success("Organized 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a `path: reason` line per entry under a header, if there are any.
    pub fn path_list(header: &str, entries: &[(PathBuf, String)]) {
        if entries.is_empty() {
            return;
        }
        Self::warning(&format!("{}: {}", header, entries.len()));
        for (path, reason) in entries {
            eprintln!("    - {}: {}", path.display(), reason);
        }
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // "Category"

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// "file" or "files".
pub fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
