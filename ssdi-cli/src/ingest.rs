//! Record Ingestion
//!
//! Reads delimited text into validated [`Record`]s. The first line is a header and
//! is skipped, as are blank lines. Only the first three columns are read:
//! species, sex and size. Rows that cannot become a record are dropped and reported
//! as [`RowDiagnostic`]s; they never abort the run.

use ssdi_stats::{Record, Sex, is_valid_size};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Tab-delimited
    Tab,
    /// Comma-separated
    Csv,
}

impl InputFormat {
    /// Column separator
    pub fn delimiter(self) -> char {
        match self {
            InputFormat::Tab => '\t',
            InputFormat::Csv => ',',
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tab" | "tsv" => Ok(InputFormat::Tab),
            "csv" => Ok(InputFormat::Csv),
            other => Err(format!("Unknown input format: {} (expected tab or csv)", other)),
        }
    }
}

/// Why a row was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    /// Fewer than species, sex and size columns
    #[error("expected at least 3 columns, found {0}")]
    TooFewColumns(usize),

    /// Sex token other than `m` or `f`
    #[error("unrecognized sex code '{0}'")]
    UnknownSex(String),

    /// Size token does not parse as a number
    #[error("size '{0}' is not a number")]
    InvalidSize(String),

    /// Size is zero, negative or not finite
    #[error("size '{0}' is not a positive finite number")]
    NonPositiveSize(String),
}

/// A dropped row and its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// Line number in the input, header is line 1
    pub line: usize,
    /// Raw line content
    pub content: String,
    /// Reason the row was dropped
    pub issue: RowIssue,
}

impl std::fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} - {}", self.line, self.issue, self.content)
    }
}

/// Records and diagnostics from one input
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Validated records in input order
    pub records: Vec<Record>,
    /// Dropped rows
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Parse one data line into a record
pub fn parse_row(line: &str, format: InputFormat) -> Result<Record, RowIssue> {
    let cols: Vec<&str> = line.split(format.delimiter()).collect();
    if cols.len() < 3 {
        return Err(RowIssue::TooFewColumns(cols.len()));
    }

    let species = cols[0];
    let sex_token = cols[1].trim();
    let size_token = cols[2].trim();

    let sex = Sex::from_code(sex_token).ok_or_else(|| RowIssue::UnknownSex(sex_token.to_string()))?;
    let size: f64 = size_token
        .parse()
        .map_err(|_| RowIssue::InvalidSize(size_token.to_string()))?;
    if !is_valid_size(size) {
        return Err(RowIssue::NonPositiveSize(size_token.to_string()));
    }

    Ok(Record::new(species, sex, size))
}

/// Read records from any buffered reader
pub fn read_records<R: BufRead>(reader: R, format: InputFormat) -> std::io::Result<Ingested> {
    let mut ingested = Ingested::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_row(trimmed, format) {
            Ok(record) => ingested.records.push(record),
            Err(issue) => ingested.diagnostics.push(RowDiagnostic {
                line: idx + 1,
                content: trimmed.to_string(),
                issue,
            }),
        }
    }

    Ok(ingested)
}

/// Read records from a file
pub fn read_records_from_path(path: &Path, format: InputFormat) -> std::io::Result<Ingested> {
    let file = std::fs::File::open(path)?;
    read_records(std::io::BufReader::new(file), format)
}
