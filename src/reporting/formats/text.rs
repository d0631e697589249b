//! Plain-text Report Generator

use super::table;
use crate::reporting::AnalysisResult;

/// Generate the text report written by `--output` without `--json`
pub fn generate(report: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("Cookie analysis results for: {}\n", report.url));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    out.push_str(&table::render(&report.cookies));
    out.push_str("\n\n");

    if report.warnings.is_empty() {
        out.push_str("✅ All cookies are secure\n");
    } else {
        out.push_str("Security Warnings:\n");
        out.push_str(&"-".repeat(20));
        out.push('\n');
        for warning in &report.warnings {
            out.push_str(&warning.message);
            out.push('\n');
        }
    }

    out
}

/// Console rendering: table, severity counts and the warning list
pub fn console(report: &AnalysisResult) -> String {
    if report.cookies.is_empty() {
        return "No cookies found in response\n".to_string();
    }

    let mut out = String::new();
    out.push_str(table::TITLE);
    out.push('\n');
    out.push_str(&table::render(&report.cookies));
    out.push_str("\n\n");

    if report.warnings.is_empty() {
        out.push_str("✅ All cookies are secure\n");
        return out;
    }

    for line in table::render_summary(&report.summary) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("\nSecurity Warnings:\n");
    for warning in &report.warnings {
        out.push_str(&warning.message);
        out.push('\n');
    }

    out
}
