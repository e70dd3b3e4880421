//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Absent values serialize as `null`; p-values carry both the raw proportion and
/// the display string.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
