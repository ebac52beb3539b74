//! External static-analysis tools.
//!
//! Rules that lint embedded code talk to the tool through the
//! [`CodeAnalyzer`] trait, so the tool itself stays out of process and can
//! be swapped for a fake in tests.

mod eslint;

pub use eslint::EslintAnalyzer;

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Rule-name prefixes removed from resolved configurations by default.
///
/// These plugins are usually configured for whole projects and report
/// noise on short snippets.
pub const DEFAULT_DENY_PREFIXES: &[&str] = &["jsdoc/", "n/", "regexp/", "unicorn/"];

/// Errors raised by an external analyzer.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The tool could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported a failure.
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        /// Program that was run.
        program: String,
        /// Exit status.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The tool produced output that could not be understood.
    #[error("invalid analyzer output: {0}")]
    InvalidOutput(String),

    /// I/O error while talking to the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration resolved by the tool for a file.
///
/// Only `rules` is interpreted; everything else is passed back to the tool
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Rule settings keyed by rule name.
    #[serde(default)]
    pub rules: Map<String, Value>,
    /// All other settings.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One finding reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerMessage {
    /// 1-based line within the analyzed snippet.
    pub line: usize,
    /// Message text.
    pub message: String,
    /// Name of the tool rule, absent for fatal errors.
    #[serde(default)]
    pub rule_id: Option<String>,
}

/// Removes tool rules by name prefix.
///
/// A rule is dropped when it matches a deny prefix and no allow prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFilter {
    allow_prefixes: Vec<String>,
    deny_prefixes: Vec<String>,
}

impl RuleFilter {
    /// Creates a filter from explicit prefix lists.
    pub fn new(allow_prefixes: Vec<String>, deny_prefixes: Vec<String>) -> Self {
        Self {
            allow_prefixes,
            deny_prefixes,
        }
    }

    /// Returns true if the tool rule `name` survives the filter.
    pub fn allows(&self, name: &str) -> bool {
        let denied = self.deny_prefixes.iter().any(|p| name.starts_with(p.as_str()));
        !denied || self.allow_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Applies the filter to a resolved configuration.
    pub fn apply(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        config.rules.retain(|name, _| self.allows(name));
        config
    }
}

impl Default for RuleFilter {
    fn default() -> Self {
        Self::new(
            Vec::new(),
            DEFAULT_DENY_PREFIXES.iter().map(|p| p.to_string()).collect(),
        )
    }
}

/// An external code analyzer.
///
/// Both operations return futures that are driven on the linting thread.
pub trait CodeAnalyzer: Send + Sync {
    /// Resolves the tool's configuration for the document `file`.
    fn resolve_config<'a>(
        &'a self,
        file: &'a str,
    ) -> LocalBoxFuture<'a, Result<AnalyzerConfig, AnalyzerError>>;

    /// Analyzes `source` with `config`.
    fn verify<'a>(
        &'a self,
        source: &'a str,
        config: &'a AnalyzerConfig,
    ) -> LocalBoxFuture<'a, Result<Vec<AnalyzerMessage>, AnalyzerError>>;
}
