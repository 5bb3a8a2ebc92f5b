//! Itemized rendering of run results.

use bootstrap_env::{Documents, RunOutcome};
use bootstrap_secrets::{CheckEntry, ReportEntry, SecretOutcome};
use bootstrap_types::ValidationResult;
use colored::Colorize;

/// Print one line per secret, aligned on the name column.
pub fn print_report(outcome: &RunOutcome) {
    let entries = outcome.report.entries();
    let width = entries.iter().map(|e| e.name.as_str().len()).max().unwrap_or(0);
    for entry in entries {
        println!("  {}", report_line(entry, width));
    }
    println!("\n  {}", outcome.report);
}

fn report_line(entry: &ReportEntry, width: usize) -> String {
    let name = format!("{:<width$}", entry.name.as_str(), width = width);
    match &entry.outcome {
        SecretOutcome::Written => format!(
            "{} {}  {}  {}",
            "✓".green().bold(),
            name,
            "written".green(),
            entry.path.display()
        ),
        SecretOutcome::Skipped => format!(
            "{} {}  {}  {}",
            "=".cyan().bold(),
            name,
            "kept".cyan(),
            entry.path.display()
        ),
        SecretOutcome::Failed(e) => format!("{} {}  {}", "✗".red().bold(), name, e.to_string().red()),
        SecretOutcome::NotAttempted => {
            format!("{} {}  {}", "-".dimmed(), name, "not attempted".dimmed())
        }
    }
}

/// Print what happened to the generated documents.
pub fn print_documents(documents: &Documents) {
    match documents {
        Documents::Written(written) => {
            println!("{} Wrote {}", "✓".green().bold(), written.env_file.display());
            println!("{} Wrote {}", "✓".green().bold(), written.summary_file.display());
            print_summary_warning();
        }
        Documents::Blocked => {
            println!(
                "{} Environment file not written: credentials are incomplete",
                "✗".red().bold()
            );
        }
        Documents::Failed(e) => {
            println!("{} Environment file not written: {}", "✗".red().bold(), e);
        }
    }
}

/// Remind the operator the summary holds a plaintext password.
pub fn print_summary_warning() {
    println!(
        "{} The credential summary contains the admin password in plain text. \
         Store it safely, then delete the file. Never commit it.",
        "!".yellow().bold()
    );
}

/// Print one check result; returns whether it counts as a problem.
pub fn print_check(entry: &CheckEntry, width: usize) -> bool {
    let name = format!("{:<width$}", entry.name.as_str(), width = width);
    match &entry.result {
        ValidationResult::Ok => {
            println!("  {} {}  {}", "✓".green().bold(), name, entry.path.display());
            false
        }
        ValidationResult::Missing => {
            println!("  {} {}  {}", "✗".red().bold(), name, "missing".red());
            true
        }
        ValidationResult::Warning(issues) => {
            println!("  {} {}  {}", "!".yellow().bold(), name, entry.path.display());
            for issue in issues {
                println!("      {}", issue.yellow());
            }
            false
        }
        ValidationResult::Error(issues) => {
            println!("  {} {}  {}", "✗".red().bold(), name, entry.path.display());
            for issue in issues {
                println!("      {}", issue.red());
            }
            true
        }
    }
}
