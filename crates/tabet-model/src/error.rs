use std::fmt;

/// A single defect found while validating a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON-pointer-style location of the offending field, e.g. `$.transforms[2].dtype`.
    pub path: String,
    /// Why the field was rejected.
    pub reason: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Configuration document failed validation.
///
/// Carries every violation found, not just the first one.
#[derive(Debug, thiserror::Error)]
#[error("{}", format_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    let mut rendered = format!(
        "invalid pipeline configuration ({} violation{})",
        violations.len(),
        if violations.len() == 1 { "" } else { "s" }
    );
    for violation in violations {
        rendered.push_str("\n  ");
        rendered.push_str(&violation.to_string());
    }
    rendered
}
