//! Output Formatting
//!
//! Human-readable terminal summary of an SSDi report:
//! - One line per species with sample sizes and SSDi estimates
//! - Permutation p-value and null-distribution bounds
//! - Classification counts and run duration

use ssdi_report::{Report, format_value};
use ssdi_stats::Classification;

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let decimals = report.meta.settings.decimals;
    let mut output = String::new();

    output.push('\n');
    output.push_str("SSDi Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for result in &report.results {
        let icon = match report.classification(result) {
            Classification::Dimorphic => "✓",
            Classification::NotDistinguishable => "·",
            Classification::InsufficientData => "⊘",
        };

        output.push_str(&format!(
            "  {} {}  (males: {}, females: {})\n",
            icon, result.species, result.n_male, result.n_female
        ));
        output.push_str(&format!(
            "      standard SSDi: {}  pairwise SSDi: {}  |diff|: {}\n",
            format_value(result.standard_ssdi, decimals),
            format_value(result.avg_pairwise_ssdi, decimals),
            format_value(result.abs_difference, decimals)
        ));
        if let Some(p) = result.p_value {
            output.push_str(&format!(
                "      p: {}  null 95%: [{}, {}]\n",
                p.format(decimals),
                format_value(result.lower_2_5, decimals),
                format_value(result.upper_97_5, decimals)
            ));
        }
        output.push('\n');
    }

    // Summary
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Species: {}  Dimorphic: {}  Not distinguishable: {}  Insufficient data: {}\n",
        report.summary.total_species,
        report.summary.dimorphic,
        report.summary.not_distinguishable,
        report.summary.insufficient_data
    ));
    output.push_str(&format!(
        "  Records: {}  Skipped rows: {}  Replicates: {}  alpha: {}\n",
        report.summary.records,
        report.summary.skipped_rows,
        report.meta.settings.replicates,
        report.meta.settings.alpha
    ));
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        report.summary.total_duration_ms
    ));

    output
}
