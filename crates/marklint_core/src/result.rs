//! Lint results.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::rule::{RuleFailure, Severity, Violation};

/// Time spent in one rule during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTiming {
    /// Primary name of the rule.
    pub rule: String,
    /// Wall-clock time from invocation to completion.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Result of linting one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintResult {
    /// Document name (usually its path).
    pub name: String,
    /// Violations sorted by line number, then rule name.
    pub violations: Vec<Violation>,
    /// Rules that could not complete, in registration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RuleFailure>,
    /// Per-rule timings, when enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timings: Vec<RuleTiming>,
}

impl LintResult {
    /// Creates an empty result for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns true if any violation was reported.
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Returns true if any violation has error severity.
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if no violations were reported and every rule completed.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }
}
