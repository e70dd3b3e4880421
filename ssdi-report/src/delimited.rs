//! Tab-delimited and CSV Output

use crate::report::Report;
use ssdi_stats::{PValue, SsdiResult};

/// Column headers, in output order
pub const COLUMNS: [&str; 11] = [
    "Species",
    "Number_Males",
    "Number_Females",
    "Avg_Male",
    "Avg_Female",
    "Standard_SSDi",
    "Avg_Pairwise_SSDi",
    "AbsDifference",
    "Dimorphism_PValue",
    "2.5_percentile",
    "97.5_percentile",
];

/// Field separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `\t`
    Tab,
    /// `,`
    Comma,
}

impl Delimiter {
    /// Separator character
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Comma => ',',
        }
    }
}

/// Format an optional number, `NA` when absent
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "NA".to_string(),
    }
}

fn format_p_value(p: Option<PValue>, decimals: usize) -> String {
    match p {
        Some(p) => p.format(decimals),
        None => "NA".to_string(),
    }
}

/// Quote a field that contains the separator, a quote or a line break
fn escape_field(field: &str, delimiter: Delimiter) -> String {
    if field.contains(delimiter.as_char()) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(result: &SsdiResult, decimals: usize) -> [String; 11] {
    [
        result.species.clone(),
        result.n_male.to_string(),
        result.n_female.to_string(),
        format_value(result.avg_male, decimals),
        format_value(result.avg_female, decimals),
        format_value(result.standard_ssdi, decimals),
        format_value(result.avg_pairwise_ssdi, decimals),
        format_value(result.abs_difference, decimals),
        format_p_value(result.p_value, decimals),
        format_value(result.lower_2_5, decimals),
        format_value(result.upper_97_5, decimals),
    ]
}

/// Generate a delimited report with a header line and one row per species
pub fn generate_delimited_report(report: &Report, delimiter: Delimiter, decimals: usize) -> String {
    let sep = delimiter.as_char().to_string();
    let mut output = String::new();

    output.push_str(&COLUMNS.join(&sep));
    output.push('\n');

    for result in &report.results {
        let fields = row(result, decimals);
        let escaped: Vec<String> = fields.iter().map(|f| escape_field(f, delimiter)).collect();
        output.push_str(&escaped.join(&sep));
        output.push('\n');
    }

    output
}
