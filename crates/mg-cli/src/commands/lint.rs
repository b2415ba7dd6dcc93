//! Lint command implementation

use anyhow::{Context, Result};
use mg_core::LintReport;

use crate::cli::{GlobalArgs, LintArgs, LintFormat};
use crate::commands::common::{self, ExitCode, EXIT_CIRCULAR_DEPENDENCY};

/// Execute the lint command
pub(crate) async fn execute(args: &LintArgs, global: &GlobalArgs) -> Result<()> {
    let root = common::root(global);
    let report = mg_core::lint(root, common::config_override(global))
        .with_context(|| format!("Failed to lint {}", root.display()))?;

    match args.format {
        LintFormat::Text => print_text(&report),
        LintFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize to JSON")?;
            println!("{}", json);
        }
    }

    exit_status(&report)
}

fn print_text(report: &LintReport) {
    for finding in &report.findings {
        println!("{}", finding);
    }
    if !report.findings.is_empty() {
        println!();
    }

    let verdict = if report.is_success() { "passed" } else { "failed" };
    println!(
        "Lint {}: {} errors, {} warnings",
        verdict,
        report.error_count(),
        report.warning_count()
    );
}

/// Warnings never fail a run; a dependency cycle gets its own exit code.
fn exit_status(report: &LintReport) -> Result<()> {
    if report.is_success() {
        Ok(())
    } else if report.has_circular_dependency() {
        Err(ExitCode(EXIT_CIRCULAR_DEPENDENCY).into())
    } else {
        Err(ExitCode(1).into())
    }
}

#[cfg(test)]
#[path = "lint_test.rs"]
mod tests;
