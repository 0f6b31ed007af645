//! Output formatting and display utilities
//!
//! Status lines go to stderr; command results go to stdout so they can be
//! piped or redirected.

use colored::{ColoredString, Colorize};

use stigview::{ChangedRule, ChecklistStats, DiffResult, LibraryFailure, Rule, Severity, Status};

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

/// Print a subheader
pub fn subheader(msg: &str) {
    println!("\n{}", msg.bold());
}

fn severity_badge(severity: Severity) -> ColoredString {
    let label = format!("[{}]", severity);
    match severity {
        Severity::CatI => label.red().bold(),
        Severity::CatII => label.yellow(),
        Severity::CatIII => label.blue(),
    }
}

fn status_badge(status: Status) -> ColoredString {
    match status {
        Status::Open => status.label().red(),
        Status::NotAFinding => status.label().green(),
        Status::NotApplicable => status.label().dimmed(),
        Status::NotReviewed => status.label().normal(),
    }
}

/// Print review statistics
pub fn print_stats(title: &str, stats: &ChecklistStats) {
    header(title);
    print!("{}", stats);

    let progress = format!("{}% reviewed", stats.percent_complete);
    if stats.total > 0 && stats.evaluated == stats.total {
        println!("{}", progress.green());
    } else {
        println!("{}", progress.yellow());
    }
}

/// Print one line per rule
pub fn print_rules(rules: &[&Rule]) {
    subheader(&format!("Rules ({}):", rules.len()));
    for rule in rules {
        println!(
            "  {} {} {} {}",
            severity_badge(rule.severity),
            rule.stig_id.cyan(),
            rule.title,
            status_badge(rule.status)
        );
    }
}

/// Print a version diff
pub fn print_diff(diff: &DiffResult) {
    if diff.is_empty() {
        success("No content differences");
        return;
    }

    if !diff.added.is_empty() {
        subheader(&format!("Added ({}):", diff.added.len()));
        for rule in &diff.added {
            println!("  {} {} {}", "+".green(), rule.stig_id.green(), rule.title);
        }
    }

    if !diff.removed.is_empty() {
        subheader(&format!("Removed ({}):", diff.removed.len()));
        for rule in &diff.removed {
            println!("  {} {} {}", "-".red(), rule.stig_id.red(), rule.title);
        }
    }

    if !diff.changed.is_empty() {
        subheader(&format!("Changed ({}):", diff.changed.len()));
        for change in &diff.changed {
            print_change(change);
        }
    }
}

fn print_change(change: &ChangedRule) {
    let fields: Vec<&str> = change.fields.iter().map(|f| f.as_str()).collect();
    println!(
        "  {} {} {}",
        "~".yellow(),
        change.stig_id.yellow(),
        format!("({})", fields.join(", ")).dimmed()
    );
    if let (Some(before), Some(after)) = (change.a.severity, change.b.severity) {
        println!("    severity: {} → {}", before, after);
    }
    if let (Some(before), Some(after)) = (&change.a.title, &change.b.title) {
        println!("    title: {}", before.dimmed());
        println!("        → {}", after);
    }
}

/// Print library bundle failures
pub fn print_failures(failures: &[LibraryFailure]) {
    warning(&format!("{} entries failed:", failures.len()));
    for failure in failures {
        eprintln!("  {} {}: {}", "✗".red(), failure.id, failure.message.dimmed());
    }
}

/// Print a JSON report
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
