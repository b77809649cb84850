//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every row leads with
//! its display position and label; ids and file paths follow as indented
//! context lines. Listings therefore read as a content inventory in the same
//! order the site shows them.
//!
//! # Output Format
//!
//! ## Admin listing
//!
//! ```text
//! Banners (2)
//! 001 [#0] Custom Websites That Drive Growth
//!     id: 6a1f…
//! 002 [#1] Spring Sale
//!     id: 0c9e…
//! ```
//!
//! ## Build
//!
//! ```text
//! Pages
//!     index.html
//!     blog/shipping-fast/index.html
//!
//! Fallback content
//!     hero_content
//!
//! Generated 8 pages, 3 assets into dist
//! Content: 4 cached, 11 fetched (15 total)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. The terminal implementations
//! of [`Notifier`] and [`Confirm`] live here as well.

use crate::admin::{AdminOutcome, RowSummary, Section};
use crate::fallback::SeedReport;
use crate::generate::BuildReport;
use crate::notify::{Confirm, Level, Notification, Notifier};
use crate::provision::ProvisionOutcome;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

/// One-line rendering of a JSON field value.
fn field_value(value: &Value) -> String {
    match value {
        Value::String(s) => truncate(&s.replace('\n', " "), 72),
        Value::Null => "(none)".to_string(),
        other => truncate(&other.to_string(), 72),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Admin
// ============================================================================

/// The dashboard menu.
///
/// ```text
/// 001 Hero Section (hero, single row)
/// 002 Banners (banners)
/// ```
pub fn format_sections() -> Vec<String> {
    Section::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let kind = if section.is_singleton() {
                ", single row"
            } else if !section.is_insertable() {
                ", edit only"
            } else {
                ""
            };
            format!("{} {} ({}{})", format_index(i + 1), section.label(), section.id(), kind)
        })
        .collect()
}

pub fn format_rows(section: Section, rows: &[RowSummary]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", section.label(), rows.len())];
    for (i, row) in rows.iter().enumerate() {
        lines.push(format!(
            "{} [{}] {}",
            format_index(i + 1),
            row.position,
            truncate(&row.label, 72)
        ));
        lines.push(format!("{}id: {}", indent(1), row.id));
    }
    lines
}

/// One field per line, keys sorted.
pub fn format_record(record: &Value) -> Vec<String> {
    match record {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}{}: {}", indent(1), key, field_value(value)))
            .collect(),
        other => vec![format!("{}{}", indent(1), field_value(other))],
    }
}

pub fn format_admin_outcome(section: Section, outcome: &AdminOutcome) -> Vec<String> {
    match outcome {
        AdminOutcome::Rows(rows) => format_rows(section, rows),
        AdminOutcome::Record(record) => {
            let mut lines = vec![section.label().to_string()];
            lines.extend(format_record(record));
            lines
        }
        AdminOutcome::Deleted { id } => vec![format!("Deleted {} row {}", section.id(), id)],
        AdminOutcome::NotSeeded { noun } => vec![format!(
            "No {} found. Run `agency-site seed` to create it.",
            noun
        )],
        AdminOutcome::Declined => vec!["Cancelled".to_string()],
    }
}

pub fn print_admin_outcome(section: Section, outcome: &AdminOutcome) {
    print_lines(format_admin_outcome(section, outcome));
}

pub fn print_sections() {
    print_lines(format_sections());
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    lines.extend(report.pages.iter().map(|page| format!("{}{}", indent(1), page)));

    if !report.fallbacks.is_empty() {
        lines.push(String::new());
        lines.push("Fallback content".to_string());
        lines.extend(
            report
                .fallbacks
                .iter()
                .map(|section| format!("{}{}", indent(1), section)),
        );
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} {}, {} {} into {}",
        report.pages.len(),
        if report.pages.len() == 1 { "page" } else { "pages" },
        report.assets,
        if report.assets == 1 { "asset" } else { "assets" },
        output_dir.display()
    ));
    lines.push(format!("Content: {}", report.cache));
    lines
}

pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    print_lines(format_build_output(report, output_dir));
}

// ============================================================================
// Seed, provisioning, notifications
// ============================================================================

pub fn format_seed_report(report: &SeedReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (table, rows) in &report.seeded {
        lines.push(format!(
            "Seeded {} ({} {})",
            table,
            rows,
            if *rows == 1 { "row" } else { "rows" }
        ));
    }
    for table in &report.skipped {
        lines.push(format!("Skipped {} (already has content)", table));
    }
    if lines.is_empty() {
        lines.push("Nothing to seed".to_string());
    }
    lines
}

pub fn print_seed_report(report: &SeedReport) {
    print_lines(format_seed_report(report));
}

pub fn format_provision(outcome: &ProvisionOutcome) -> Vec<String> {
    match outcome {
        ProvisionOutcome::Created { user_id } => {
            vec![outcome.to_string(), format!("{}user id: {}", indent(1), user_id)]
        }
        ProvisionOutcome::AlreadyExists => vec![outcome.to_string()],
    }
}

pub fn print_provision(outcome: &ProvisionOutcome) {
    print_lines(format_provision(outcome));
}

pub fn format_notification(notification: &Notification) -> String {
    match notification.level {
        Level::Success => format!("\u{2713} {}", notification.message),
        Level::Error => format!("\u{2717} {}", notification.message),
    }
}

/// Notifications on the terminal: successes to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notification: Notification) {
        let line = format_notification(&notification);
        match notification.level {
            Level::Success => println!("{}", line),
            Level::Error => eprintln!("{}", line),
        }
    }
}

/// `[y/N]` prompt on stdin. Anything but `y`/`yes` declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ============================================================================
// Tests
// ============================================================================
