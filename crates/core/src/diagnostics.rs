//! Compile-time diagnostics produced by static analysis.
//!
//! - `Diagnostic`: one finding, naming the offending node and the reason
//! - `DiagnosticKind`: which analysis pass produced it
//! - `Severity`: warning or error
//!
//! # Examples
//!
//! ```
//! # use ludeme_core::diagnostics::*;
//! let diag = Diagnostic::error(
//!     DiagnosticKind::MissingRequirement,
//!     "(is Unique)",
//!     "the game is not a deduction puzzle",
//! );
//! assert_eq!(
//!     diag.to_string(),
//!     "error: missing requirement: (is Unique): the game is not a deduction puzzle"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Analysis finding attached to a single rule node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Pass that reported this finding
    pub kind: DiagnosticKind,
    /// Severity level
    pub severity: Severity,
    /// Description of the offending node
    pub node: String,
    /// Human-readable reason
    pub message: String,
}

/// Category of analysis finding.
///
/// # Invariant
///
/// The discriminant values must match the KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticKind {
    /// The rules depend on a capability the game does not declare
    MissingRequirement = 0,
    /// Running the rules against this game is known to fault
    PredictedCrash = 1,
}

/// Human-readable names for diagnostic kinds.
///
/// Index matches DiagnosticKind discriminant.
const KIND_NAMES: &[&str] = &[
    "missing requirement", // 0: MissingRequirement
    "predicted crash",     // 1: PredictedCrash
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Reported but compilation proceeds
    Warning,
    /// Compilation cannot proceed
    Error,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(kind: DiagnosticKind, node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(kind, Severity::Error, node, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(
        kind: DiagnosticKind,
        node: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_severity(kind, Severity::Warning, node, message)
    }

    fn with_severity(
        kind: DiagnosticKind,
        severity: Severity,
        node: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            node: node.into(),
            message: message.into(),
        }
    }

    /// Same finding with a different severity.
    pub fn downgraded(self) -> Self {
        Self {
            severity: Severity::Warning,
            ..self
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl DiagnosticKind {
    /// Returns a human-readable name for this kind.
    pub fn name(self) -> &'static str {
        KIND_NAMES[self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.severity,
            self.kind.name(),
            self.node,
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Formats a list of diagnostics, one per line.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
