//! Console statistics for a finished run
//!
//! This module renders a `CrawlReport` as the plain-text summary printed at
//! the end of every run.

use crate::output::report::CrawlReport;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Counts visits by outcome label
pub fn outcome_counts(report: &CrawlReport) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for visit in &report.visits {
        *counts.entry(visit.outcome.label()).or_insert(0) += 1;
    }
    counts
}

/// Formats the statistics block for a report
pub fn format_statistics(report: &CrawlReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== {} Statistics ===\n", report.mode);
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Target: {}", report.target);
    let _ = writeln!(out, "  Session: {}", report.state);
    let _ = writeln!(out, "  Routes discovered: {}", report.discovered.len());
    let _ = writeln!(out, "  Routes visited: {}", report.visits.len());
    let _ = writeln!(out, "  Routes excluded: {}", report.excluded.len());
    if let Some(duration) = report.duration_seconds() {
        let _ = writeln!(out, "  Elapsed: {:.2}s", duration);
    }
    let _ = writeln!(out);

    let counts = outcome_counts(report);
    if !counts.is_empty() {
        let _ = writeln!(out, "Visits by Outcome:");
        let mut by_count: Vec<_> = counts.iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (label, count) in by_count {
            let percentage = (*count as f64 / report.visits.len() as f64) * 100.0;
            let _ = writeln!(out, "  {}: {} ({:.1}%)", label, count, percentage);
        }
        let _ = writeln!(out);
    }

    if report.failed_count() > 0 {
        let _ = writeln!(out, "Failures:");
        for visit in report.failures() {
            let _ = writeln!(out, "  - {} ({})", visit.route, visit.outcome);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} routes captured)",
        report.success_rate(),
        report.captured_count(),
        report.visits.len()
    );

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    print!("{}", format_statistics(report));
}
