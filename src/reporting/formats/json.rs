//! JSON Report Generator
//!
//! Generates the machine-readable document written by `--json` and returned
//! by the web form.

use crate::error::ExportError;
use crate::reporting::AnalysisResult;

/// Generate JSON report
pub fn generate(report: &AnalysisResult) -> Result<String, ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
