//! Diagnostics returned alongside analysis results
//!
//! The engine never logs. Each analysis returns its messages and the caller decides
//! where they go.

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Detail useful when tracing a run
    Debug,
    /// Normal progress information
    Info,
    /// Something the user should look at
    Warn,
}

/// One message produced during analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub level: DiagnosticLevel,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Debug-level message
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Debug,
            message: message.into(),
        }
    }

    /// Info-level message
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
        }
    }

    /// Warning
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
