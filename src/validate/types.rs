//! Result types for the structural pre-check.

use serde::Serialize;

/// Label used for problems that concern the markup text itself.
pub const MARKUP_LABEL: &str = "<markup>";

/// A single problem found by the pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// The file the problem concerns, or [`MARKUP_LABEL`].
    pub file: String,
    pub reason: String,
}

impl Problem {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// A problem with the markup text rather than a referenced file.
    pub fn markup(reason: impl Into<String>) -> Self {
        Self::new(MARKUP_LABEL, reason)
    }
}

/// Result of validating one or more markup files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Whether no problems were found.
    pub ok: bool,
    /// Problems in discovery order (empty if ok).
    pub problems: Vec<Problem>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::pass()
    }
}

impl ValidationResult {
    /// Create a passing result.
    pub fn pass() -> Self {
        Self {
            ok: true,
            problems: Vec::new(),
        }
    }

    /// Build a result from collected problems.
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        Self {
            ok: problems.is_empty(),
            problems,
        }
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.ok &= other.ok;
        self.problems.extend(other.problems);
    }

    /// Format the result as a user-facing report.
    ///
    /// ```text
    /// ✗ data/h.csv: missing data file
    ///
    /// Some files are missing or invalid.
    /// ```
    pub fn format_report(&self) -> String {
        if self.ok {
            return "All files are present and valid!".to_string();
        }

        let mut msg = String::new();
        for problem in &self.problems {
            msg.push_str(&format!("✗ {}: {}\n", problem.file, problem.reason));
        }
        msg.push_str("\nSome files are missing or invalid.");
        msg
    }
}
