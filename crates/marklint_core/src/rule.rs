//! Rule contract.
//!
//! A [`Rule`] pairs a [`RuleDescriptor`] with a [`RuleFunction`]. Rule
//! functions never build [`Violation`]s themselves; they hand
//! [`ErrorInfo`]s to the per-invocation [`Reporter`], which validates the
//! line number and stamps the rule's identity and severity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use futures_util::future::LocalBoxFuture;
use marklint_parser::ParserKind;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::analyzer::AnalyzerError;
use crate::context::LintContext;

/// Static description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Rule names; the first one is the primary name.
    pub names: Vec<String>,
    /// One-line description.
    pub description: String,
    /// Tags used to enable or disable groups of rules.
    pub tags: Vec<String>,
    /// Link to further documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
    /// Parser whose token stream the rule reads.
    pub parser: ParserKind,
    /// Whether the rule function is asynchronous.
    pub asynchronous: bool,
}

impl RuleDescriptor {
    /// Creates a synchronous markdown rule descriptor with no tags.
    pub fn new<I, S>(names: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            description: description.into(),
            tags: Vec::new(),
            information: None,
            parser: ParserKind::Markdown,
            asynchronous: false,
        }
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the documentation link.
    pub fn with_information(mut self, url: impl Into<String>) -> Self {
        self.information = Some(url.into());
        self
    }

    /// Sets the parser.
    pub fn with_parser(mut self, parser: ParserKind) -> Self {
        self.parser = parser;
        self
    }

    /// Marks the rule as asynchronous.
    pub fn with_asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = asynchronous;
        self
    }

    /// Returns the primary name.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Returns true if `name` is one of the rule's names, ignoring case.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    fn validate(&self) -> Result<(), RuleDefinitionError> {
        if self.names.is_empty() {
            return Err(RuleDefinitionError::EmptyNames);
        }
        if let Some(index) = self.names.iter().position(|n| n.trim().is_empty()) {
            return Err(RuleDefinitionError::EmptyName { index });
        }
        let rule = self.name().to_string();
        if self.description.trim().is_empty() {
            return Err(RuleDefinitionError::EmptyDescription { rule });
        }
        if self.tags.is_empty() || self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(RuleDefinitionError::EmptyTags { rule });
        }
        Ok(())
    }
}

/// Severity of a violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error (default).
    #[default]
    Error,
    /// Warning.
    Warning,
}

impl Severity {
    /// Returns the lowercase name of the severity.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// What a rule reports: a line plus optional detail and context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// 1-based line number in the linted document.
    pub line_number: usize,
    /// Additional detail about the problem.
    pub detail: Option<String>,
    /// Text near the problem, usually the offending line.
    pub context: Option<String>,
}

impl ErrorInfo {
    /// Creates an error for `line_number` with no detail.
    pub fn new(line_number: usize) -> Self {
        Self {
            line_number,
            detail: None,
            context: None,
        }
    }

    /// Sets the detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A reported problem, stamped with the identity of the reporting rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Primary name of the rule.
    pub rule_name: String,
    /// All names of the rule.
    pub rule_names: Vec<String>,
    /// Description of the rule.
    pub rule_description: String,
    /// Documentation link of the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_information: Option<String>,
    /// 1-based line number.
    pub line_number: usize,
    /// Additional detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Text near the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Configured severity of the rule.
    pub severity: Severity,
}

/// Errors raised while running a rule.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// The rule's configuration is malformed or its parser is unavailable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The rule failed while running.
    #[error("execution failed: {0}")]
    Execution(String),

    /// An external tool used by the rule failed.
    #[error("external analyzer failed: {0}")]
    External(String),

    /// The rule panicked.
    #[error("rule panicked: {0}")]
    Panic(String),

    /// The rule reported a line outside the document.
    #[error("reported line {line_number} outside of document with {line_count} lines")]
    InvalidLineNumber {
        /// The reported line number.
        line_number: usize,
        /// Number of lines in the document.
        line_count: usize,
    },
}

impl RuleError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

impl From<AnalyzerError> for RuleError {
    fn from(err: AnalyzerError) -> Self {
        Self::External(err.to_string())
    }
}

/// A rule that did not complete normally, recorded next to the results.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    /// Primary name of the rule.
    pub rule: String,
    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub error: RuleError,
}

fn serialize_display<S: Serializer>(error: &RuleError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Errors in a rule definition or its registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDefinitionError {
    /// The rule has no names.
    #[error("rule must have at least one name")]
    EmptyNames,

    /// One of the names is empty.
    #[error("rule name at index {index} is empty")]
    EmptyName {
        /// Position of the empty name.
        index: usize,
    },

    /// The description is empty.
    #[error("rule '{rule}' has an empty description")]
    EmptyDescription {
        /// Primary name of the rule.
        rule: String,
    },

    /// The rule has no tags, or an empty tag.
    #[error("rule '{rule}' must have at least one non-empty tag")]
    EmptyTags {
        /// Primary name of the rule.
        rule: String,
    },

    /// The `asynchronous` flag does not match the function kind.
    #[error(
        "rule '{rule}' declares asynchronous={declared} but its function is {}",
        function_kind(.declared)
    )]
    AsyncMismatch {
        /// Primary name of the rule.
        rule: String,
        /// The declared flag.
        declared: bool,
    },

    /// The name is already taken by another rule.
    #[error("rule name '{name}' is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
}

/// Inputs of one rule invocation.
///
/// All fields are shared borrows of the current pass, so the struct is
/// `Copy` and can be moved into an asynchronous rule's future.
#[derive(Clone, Copy)]
pub struct RuleParams<'a> {
    /// Document name (usually its path).
    pub name: &'a str,
    /// Document lines without terminators.
    pub lines: &'a [&'a str],
    /// The rule's options object (`null` if none).
    pub config: &'a Value,
    /// Parsed document.
    pub context: &'a LintContext<'a>,
}

impl<'a> RuleParams<'a> {
    /// Creates parameters for `context` with the given rule options.
    pub fn new(context: &'a LintContext<'a>, config: &'a Value) -> Self {
        Self {
            name: context.name(),
            lines: context.line_texts(),
            config,
            context,
        }
    }
}

/// A rule that runs to completion when invoked.
pub trait SyncRule: Send + Sync {
    /// Checks the rule's options before it runs.
    fn validate_config(&self, _config: &Value) -> Result<(), RuleError> {
        Ok(())
    }

    /// Lints the document.
    fn lint(&self, params: &RuleParams<'_>, reporter: &Reporter) -> Result<(), RuleError>;
}

/// A rule whose work completes later, e.g. after external process I/O.
pub trait AsyncRule: Send + Sync {
    /// Checks the rule's options before it runs.
    fn validate_config(&self, _config: &Value) -> Result<(), RuleError> {
        Ok(())
    }

    /// Lints the document. The returned future completes once every
    /// report has been made.
    fn lint<'a>(
        &'a self,
        params: RuleParams<'a>,
        reporter: &'a Reporter,
    ) -> LocalBoxFuture<'a, Result<(), RuleError>>;
}

/// The two kinds of rule function.
pub enum RuleFunction {
    /// Synchronous function.
    Sync(Box<dyn SyncRule>),
    /// Asynchronous function.
    Async(Box<dyn AsyncRule>),
}

impl RuleFunction {
    /// Returns true for asynchronous functions.
    pub fn is_async(&self) -> bool {
        matches!(self, RuleFunction::Async(_))
    }

    /// Checks the rule's options.
    pub fn validate_config(&self, config: &Value) -> Result<(), RuleError> {
        match self {
            RuleFunction::Sync(f) => f.validate_config(config),
            RuleFunction::Async(f) => f.validate_config(config),
        }
    }
}

impl fmt::Debug for RuleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleFunction::Sync(_) => f.write_str("RuleFunction::Sync"),
            RuleFunction::Async(_) => f.write_str("RuleFunction::Async"),
        }
    }
}

/// A validated rule.
#[derive(Debug)]
pub struct Rule {
    descriptor: RuleDescriptor,
    function: RuleFunction,
}

/// Names the kind of function a rule actually has, given its declared flag.
fn function_kind(declared: &bool) -> &'static str {
    if *declared {
        "synchronous"
    } else {
        "asynchronous"
    }
}

impl Rule {
    /// Creates a rule, validating its descriptor.
    pub fn new(
        descriptor: RuleDescriptor,
        function: RuleFunction,
    ) -> Result<Self, RuleDefinitionError> {
        descriptor.validate()?;
        if descriptor.asynchronous != function.is_async() {
            return Err(RuleDefinitionError::AsyncMismatch {
                rule: descriptor.name().to_string(),
                declared: descriptor.asynchronous,
            });
        }
        Ok(Self {
            descriptor,
            function,
        })
    }

    /// Creates a synchronous rule.
    pub fn sync(
        descriptor: RuleDescriptor,
        function: impl SyncRule + 'static,
    ) -> Result<Self, RuleDefinitionError> {
        Self::new(descriptor, RuleFunction::Sync(Box::new(function)))
    }

    /// Creates an asynchronous rule.
    pub fn asynchronous(
        descriptor: RuleDescriptor,
        function: impl AsyncRule + 'static,
    ) -> Result<Self, RuleDefinitionError> {
        Self::new(descriptor, RuleFunction::Async(Box::new(function)))
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    /// Returns the primary name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Returns the function.
    pub fn function(&self) -> &RuleFunction {
        &self.function
    }
}

/// Registry of rules, kept in registration order.
///
/// Names are unique across all rules, ignoring case.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    pub fn register(&mut self, rule: Rule) -> Result<(), RuleDefinitionError> {
        let keys: Vec<String> = rule
            .descriptor
            .names
            .iter()
            .map(|n| n.to_ascii_lowercase())
            .collect();

        for (i, key) in keys.iter().enumerate() {
            if self.index.contains_key(key) || keys[..i].contains(key) {
                return Err(RuleDefinitionError::DuplicateName {
                    name: rule.descriptor.names[i].clone(),
                });
            }
        }

        debug!("Registered rule '{}'", rule.name());
        let position = self.rules.len();
        self.index
            .extend(keys.into_iter().map(|key| (key, position)));
        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_rule(mut self, rule: Rule) -> Result<Self, RuleDefinitionError> {
        self.register(rule)?;
        Ok(self)
    }

    /// Looks up a rule by any of its names, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.rules[i])
    }

    /// Iterates over the rules in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'s> IntoIterator for &'s RuleSet {
    type Item = &'s Rule;
    type IntoIter = std::slice::Iter<'s, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Per-invocation reporting channel.
///
/// Rules report through a shared reference so that a pending asynchronous
/// rule can keep reporting while the engine holds the same reporter.
#[derive(Debug)]
pub struct Reporter {
    rule_name: String,
    rule_names: Vec<String>,
    rule_description: String,
    rule_information: Option<String>,
    severity: Severity,
    line_count: usize,
    violations: RefCell<Vec<Violation>>,
    defects: RefCell<Vec<RuleError>>,
}

impl Reporter {
    /// Creates a reporter for one invocation of the described rule on a
    /// document with `line_count` lines.
    pub fn new(descriptor: &RuleDescriptor, severity: Severity, line_count: usize) -> Self {
        Self {
            rule_name: descriptor.name().to_string(),
            rule_names: descriptor.names.clone(),
            rule_description: descriptor.description.clone(),
            rule_information: descriptor.information.clone(),
            severity,
            line_count,
            violations: RefCell::new(Vec::new()),
            defects: RefCell::new(Vec::new()),
        }
    }

    /// Reports a problem.
    ///
    /// Line numbers outside `1..=line_count` are recorded as
    /// [`RuleError::InvalidLineNumber`] instead of a violation.
    pub fn report(&self, info: ErrorInfo) {
        if info.line_number == 0 || info.line_number > self.line_count {
            self.defects
                .borrow_mut()
                .push(RuleError::InvalidLineNumber {
                    line_number: info.line_number,
                    line_count: self.line_count,
                });
            return;
        }

        self.violations.borrow_mut().push(Violation {
            rule_name: self.rule_name.clone(),
            rule_names: self.rule_names.clone(),
            rule_description: self.rule_description.clone(),
            rule_information: self.rule_information.clone(),
            line_number: info.line_number,
            detail: info.detail,
            context: info.context,
            severity: self.severity,
        });
    }

    /// Number of lines in the document being linted.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Takes the accumulated violations and reporting defects.
    pub fn take(&self) -> (Vec<Violation>, Vec<RuleError>) {
        (self.violations.take(), self.defects.take())
    }
}
