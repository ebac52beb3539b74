//! # marklint_core
//!
//! Rule engine for marklint.
//!
//! This crate provides:
//! - The [`Linter`] orchestrator and its file-level entry points
//! - The rule contract ([`Rule`], [`RuleSet`], [`Reporter`])
//! - Token filtering and line metadata helpers for rule authors
//! - Configuration loading
//! - The built-in rules and the external analyzer interface
//!
//! ## Example
//!
//! ```rust
//! use marklint_core::rules::EveryNLines;
//! use marklint_core::{Linter, LinterConfig, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.register(EveryNLines::rule().unwrap()).unwrap();
//! let linter = Linter::new(rules, LinterConfig::new()).unwrap();
//!
//! let result = linter.lint_str("README.md", "one\ntwo\nthree\nfour").unwrap();
//! let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
//! assert_eq!(lines, vec![2, 4]);
//! ```

pub mod analyzer;
mod config;
pub mod context;
mod error;
pub mod file_finder;
pub mod filter;
pub mod line_metadata;
mod linter;
mod result;
mod rule;
pub mod rules;

pub use config::{CONFIG_FILE_NAMES, LinterConfig, ResolvedRule, RuleOption};
pub use context::LintContext;
pub use error::LinterError;
pub use filter::{filter_tokens, iter_tokens};
pub use line_metadata::{LineKind, LineMetadata, LineRecord, for_each_line, get_line_metadata};
pub use linter::{LintFilesResult, Linter, PassState};
pub use result::{LintResult, RuleTiming};
pub use rule::{
    AsyncRule, ErrorInfo, Reporter, Rule, RuleDefinitionError, RuleDescriptor, RuleError,
    RuleFailure, RuleFunction, RuleParams, RuleSet, Severity, SyncRule, Violation,
};

pub use marklint_ast::{Token, TokenType};
pub use marklint_parser::ParserKind;
