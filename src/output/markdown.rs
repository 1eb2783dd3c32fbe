//! Markdown report generation
//!
//! This module generates human-readable markdown reports of a run,
//! including statistics, the visit order and every failed route.

use crate::output::report::CrawlReport;
use crate::output::stats::outcome_counts;
use crate::output::{OutputError, OutputResult};
use std::path::Path;

/// Writes the markdown report of a run to a file
///
/// # Arguments
///
/// * `report` - The finished run
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    if output_path.is_dir() {
        return Err(OutputError::Write(format!(
            "{} is a directory",
            output_path.display()
        )));
    }

    let markdown = format_markdown_report(report);
    std::fs::write(output_path, markdown)?;
    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Route-Trawler Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Mode**: {}\n", report.mode));
    md.push_str(&format!("- **Target**: {}\n", report.target));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!("- **Duration**: {:.2} seconds\n", duration));
    }
    md.push_str(&format!("- **Status**: {}\n", report.state));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Routes Discovered**: {}\n",
        report.discovered.len()
    ));
    md.push_str(&format!("- **Routes Visited**: {}\n", report.visits.len()));
    md.push_str(&format!("- **Routes Excluded**: {}\n", report.excluded.len()));
    md.push_str(&format!("- **Captured**: {}\n", report.captured_count()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    let counts = outcome_counts(report);
    if !counts.is_empty() {
        md.push_str("## Outcome Breakdown\n\n");
        md.push_str("| Outcome | Count |\n");
        md.push_str("|---------|-------|\n");
        for (label, count) in &counts {
            md.push_str(&format!("| {} | {} |\n", label, count));
        }
        md.push('\n');
    }

    if !report.visits.is_empty() {
        md.push_str("## Visit Order\n\n");
        md.push_str("| # | Route | Outcome | New Links | Capture |\n");
        md.push_str("|---|-------|---------|-----------|---------|\n");
        for (index, visit) in report.visits.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                index + 1,
                visit.route,
                visit.outcome.label(),
                visit.links_found,
                visit.key_path.as_deref().unwrap_or("-")
            ));
        }
        md.push('\n');
    }

    if !report.excluded.is_empty() {
        md.push_str("## Excluded Routes\n\n");
        for route in &report.excluded {
            md.push_str(&format!("- {}\n", route));
        }
        md.push('\n');
    }

    if report.failed_count() > 0 {
        md.push_str("## Failures\n\n");
        md.push_str("| Route | Error |\n");
        md.push_str("|-------|-------|\n");
        for visit in report.failures() {
            md.push_str(&format!(
                "| {} | {} |\n",
                visit.route,
                visit.outcome.message().unwrap_or(visit.outcome.label())
            ));
        }
        md.push('\n');
    }

    md
}
