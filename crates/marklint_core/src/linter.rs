//! Main linter orchestrator.
//!
//! A pass over one document moves through
//! `Idle -> Parsing -> Running -> Aggregating -> Done`, or ends in `Failed`
//! when the document cannot be parsed. Everything a pass allocates lives in
//! the pass; nothing is carried over to the next one.

use std::any::Any;
use std::collections::HashSet;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, join_all};
use marklint_ast::TokenArena;
use marklint_parser::{MarkdownParser, Parser, ParserKind, PlainTextParser};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{LinterConfig, ResolvedRule};
use crate::context::{LintContext, split_lines};
use crate::file_finder::FileFinder;
use crate::result::{LintResult, RuleTiming};
use crate::rule::{Reporter, Rule, RuleError, RuleFailure, RuleFunction, RuleParams, RuleSet};
use crate::{LinterError, Violation};

/// Result of linting several files: successes and per-file failures.
pub type LintFilesResult = Result<(Vec<LintResult>, Vec<(PathBuf, LinterError)>), LinterError>;

/// Stage of a lint pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// Nothing has happened yet.
    Idle,
    /// The document is being parsed.
    Parsing,
    /// Rules are running or pending.
    Running,
    /// Results are being merged and sorted.
    Aggregating,
    /// The pass finished.
    Done,
    /// The document could not be parsed.
    Failed,
}

struct Pass<'n> {
    name: &'n str,
    state: PassState,
}

impl<'n> Pass<'n> {
    fn new(name: &'n str) -> Self {
        Self {
            name,
            state: PassState::Idle,
        }
    }

    fn advance(&mut self, next: PassState) {
        debug!("{}: {:?} -> {:?}", self.name, self.state, next);
        self.state = next;
    }
}

/// An enabled rule and its resolved settings.
struct Invocation<'r> {
    rule: &'r Rule,
    settings: ResolvedRule,
}

/// What an asynchronous rule's future resolves to.
type Completion = (usize, Result<(), RuleError>, Duration);

/// The main linter.
///
/// Holds the rule set, the parsers and the configuration, all of which are
/// reused across passes.
pub struct Linter {
    rules: RuleSet,
    config: LinterConfig,
    parsers: Vec<Box<dyn Parser>>,
    finder: FileFinder,
}

impl Linter {
    /// Creates a linter with the markdown and plain text parsers.
    pub fn new(rules: RuleSet, config: LinterConfig) -> Result<Self, LinterError> {
        Self::with_parsers(
            rules,
            config,
            vec![
                Box::new(MarkdownParser::new()),
                Box::new(PlainTextParser::new()),
            ],
        )
    }

    /// Creates a linter with an explicit set of parsers.
    pub fn with_parsers(
        rules: RuleSet,
        config: LinterConfig,
        parsers: Vec<Box<dyn Parser>>,
    ) -> Result<Self, LinterError> {
        let finder = FileFinder::new(&config.include, &config.exclude)?;
        Ok(Self {
            rules,
            config,
            parsers,
            finder,
        })
    }

    /// Returns the rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    fn parser(&self, kind: ParserKind) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
    }

    /// Lints one document.
    ///
    /// Synchronous rules run in registration order; asynchronous rules are
    /// started in the same loop and awaited together afterwards. Only a
    /// parse failure aborts the pass; rule errors and panics are recorded
    /// in [`LintResult::failures`].
    pub async fn lint_document(&self, name: &str, text: &str) -> Result<LintResult, LinterError> {
        let mut pass = Pass::new(name);

        let invocations: Vec<Invocation<'_>> = self
            .rules
            .iter()
            .filter_map(|rule| {
                self.config
                    .resolve(rule.descriptor())
                    .map(|settings| Invocation { rule, settings })
            })
            .collect();

        pass.advance(PassState::Parsing);
        let arena = TokenArena::with_capacity(text.len());
        let mut kinds: Vec<ParserKind> = invocations
            .iter()
            .map(|inv| inv.rule.descriptor().parser)
            .filter(|&kind| self.parser(kind).is_some())
            .collect();
        kinds.sort();
        kinds.dedup();

        let mut contexts = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let Some(parser) = self.parser(kind) else {
                continue;
            };
            match parser.parse(&arena, text) {
                Ok(stream) => contexts.push(LintContext::new(name, text, stream)),
                Err(e) => {
                    pass.advance(PassState::Failed);
                    return Err(e.into());
                }
            }
        }

        debug!("{}: token arena holds {} bytes", name, arena.allocated_bytes());

        pass.advance(PassState::Running);
        let line_count = match contexts.first() {
            Some(context) => context.line_count(),
            None => split_lines(text).len(),
        };
        let reporters: Vec<Reporter> = invocations
            .iter()
            .map(|inv| Reporter::new(inv.rule.descriptor(), inv.settings.severity, line_count))
            .collect();

        let mut failures: Vec<(usize, RuleError)> = Vec::new();
        let mut timings: Vec<(usize, Duration)> = Vec::new();
        let mut pending: Vec<LocalBoxFuture<'_, Completion>> = Vec::new();

        for (index, (inv, reporter)) in invocations.iter().zip(&reporters).enumerate() {
            let descriptor = inv.rule.descriptor();
            let Some(context) = contexts.iter().find(|c| c.parser() == descriptor.parser) else {
                failures.push((
                    index,
                    RuleError::config(format!("parser '{}' is not available", descriptor.parser)),
                ));
                continue;
            };
            if let Err(e) = inv.rule.function().validate_config(&inv.settings.options) {
                failures.push((index, e));
                continue;
            }

            debug!("Running rule '{}'", inv.rule.name());
            let params = RuleParams::new(context, &inv.settings.options);
            let started = Instant::now();
            match inv.rule.function() {
                RuleFunction::Sync(function) => {
                    let outcome =
                        catch_unwind(AssertUnwindSafe(|| function.lint(&params, reporter)))
                            .unwrap_or_else(|payload| {
                                Err(RuleError::Panic(panic_message(payload)))
                            });
                    timings.push((index, started.elapsed()));
                    if let Err(e) = outcome {
                        failures.push((index, e));
                    }
                }
                RuleFunction::Async(function) => {
                    match catch_unwind(AssertUnwindSafe(|| function.lint(params, reporter))) {
                        Ok(future) => pending.push(
                            AssertUnwindSafe(future)
                                .catch_unwind()
                                .map(move |outcome| {
                                    let outcome = outcome.unwrap_or_else(|payload| {
                                        Err(RuleError::Panic(panic_message(payload)))
                                    });
                                    (index, outcome, started.elapsed())
                                })
                                .boxed_local(),
                        ),
                        Err(payload) => {
                            timings.push((index, started.elapsed()));
                            failures.push((index, RuleError::Panic(panic_message(payload))));
                        }
                    }
                }
            }
        }

        for (index, outcome, elapsed) in join_all(pending).await {
            timings.push((index, elapsed));
            if let Err(e) = outcome {
                failures.push((index, e));
            }
        }

        pass.advance(PassState::Aggregating);
        let mut violations: Vec<Violation> = Vec::new();
        for (index, reporter) in reporters.iter().enumerate() {
            let (reported, defects) = reporter.take();
            violations.extend(reported);
            failures.extend(defects.into_iter().map(|e| (index, e)));
        }

        if self.config.deduplicate {
            let mut seen = HashSet::new();
            violations.retain(|v| {
                seen.insert((v.rule_name.clone(), v.line_number, v.detail.clone()))
            });
        }
        violations.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });

        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<RuleFailure> = failures
            .into_iter()
            .map(|(index, error)| {
                let rule = invocations[index].rule.name().to_string();
                warn!("Rule '{}' failed on {}: {}", rule, name, error);
                RuleFailure { rule, error }
            })
            .collect();

        let timings = if self.config.timings {
            timings.sort_by_key(|(index, _)| *index);
            timings
                .into_iter()
                .map(|(index, elapsed)| RuleTiming {
                    rule: invocations[index].rule.name().to_string(),
                    elapsed,
                })
                .collect()
        } else {
            Vec::new()
        };

        pass.advance(PassState::Done);
        Ok(LintResult {
            name: name.to_string(),
            violations,
            failures,
            timings,
        })
    }

    /// Lints one document, blocking the current thread until every rule
    /// has completed.
    pub fn lint_str(&self, name: &str, text: &str) -> Result<LintResult, LinterError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.lint_document(name, text))
    }

    /// Lints one file.
    pub fn lint_file(&self, path: &Path) -> Result<LintResult, LinterError> {
        debug!("Linting {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| LinterError::file(format!("Failed to read {}: {}", path.display(), e)))?;
        self.lint_str(&path.display().to_string(), &content)
    }

    /// Lints a list of files in parallel using rayon.
    ///
    /// Each file gets its own single-threaded pass. Returns a tuple of
    /// (successful results, failed files with errors).
    pub fn lint_files(&self, paths: &[PathBuf]) -> LintFilesResult {
        let results: Vec<Result<LintResult, (PathBuf, LinterError)>> = paths
            .par_iter()
            .map(|path| self.lint_file(path).map_err(|e| (path.clone(), e)))
            .collect();

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(lint_result) => successes.push(lint_result),
                Err((path, error)) => {
                    warn!("Failed to lint {}: {}", path.display(), error);
                    failures.push((path, error));
                }
            }
        }

        Ok((successes, failures))
    }

    /// Lints the files matched by `patterns`.
    ///
    /// Patterns are resolved against the configuration's directory, or the
    /// current directory when the configuration was not loaded from a file.
    pub fn lint_patterns(&self, patterns: &[String]) -> LintFilesResult {
        let base_dir = self
            .config
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let files = self.finder.discover(patterns, &base_dir)?;
        self.lint_files(&files)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{AsyncRule, ErrorInfo, RuleDescriptor, Severity, SyncRule};
    use crate::rules::EveryNLines;
    use pretty_assertions::assert_eq;

    struct Fixed(Vec<usize>);

    impl SyncRule for Fixed {
        fn lint(&self, _params: &RuleParams<'_>, reporter: &Reporter) -> Result<(), RuleError> {
            for &line in &self.0 {
                reporter.report(ErrorInfo::new(line).with_detail("fixed"));
            }
            Ok(())
        }
    }

    struct Failing;

    impl SyncRule for Failing {
        fn lint(&self, _params: &RuleParams<'_>, _reporter: &Reporter) -> Result<(), RuleError> {
            Err(RuleError::execution("boom"))
        }
    }

    struct Panicking;

    impl SyncRule for Panicking {
        fn lint(&self, _params: &RuleParams<'_>, reporter: &Reporter) -> Result<(), RuleError> {
            reporter.report(ErrorInfo::new(1));
            panic!("rule exploded");
        }
    }

    struct Yielding(usize);

    impl AsyncRule for Yielding {
        fn lint<'a>(
            &'a self,
            _params: RuleParams<'a>,
            reporter: &'a Reporter,
        ) -> LocalBoxFuture<'a, Result<(), RuleError>> {
            Box::pin(async move {
                tokio::task::yield_now().await;
                reporter.report(ErrorInfo::new(self.0));
                Ok(())
            })
        }
    }

    fn sync_rule(name: &str, function: impl SyncRule + 'static) -> Rule {
        Rule::sync(RuleDescriptor::new([name], "test rule").with_tags(["test"]), function).unwrap()
    }

    fn linter(rules: Vec<Rule>, config: LinterConfig) -> Linter {
        let mut set = RuleSet::new();
        for rule in rules {
            set.register(rule).unwrap();
        }
        Linter::new(set, config).unwrap()
    }

    #[test]
    fn test_every_n_lines_default_period() {
        let linter = linter(vec![EveryNLines::rule().unwrap()], LinterConfig::new());
        let result = linter.lint_str("doc.md", "a\nb\nc\nd\ne").unwrap();

        let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(result.violations[0].detail.as_deref(), Some("Line number 2"));
        assert_eq!(result.violations[0].rule_name, "every-n-lines");
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_every_n_lines_with_bare_carriage_returns() {
        let linter = linter(vec![EveryNLines::rule().unwrap()], LinterConfig::new());
        let result = linter.lint_str("doc.md", "a\rb\rc\rd\re").unwrap();

        let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
        assert_eq!(lines, vec![2, 4]);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_violations_sorted_by_line_then_rule() {
        let linter = linter(
            vec![
                sync_rule("zeta", Fixed(vec![3, 1])),
                sync_rule("alpha", Fixed(vec![3])),
            ],
            LinterConfig::new(),
        );
        let result = linter.lint_str("doc.md", "1\n2\n3").unwrap();

        let order: Vec<_> = result
            .violations
            .iter()
            .map(|v| (v.line_number, v.rule_name.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "zeta"), (3, "alpha"), (3, "zeta")]);
    }

    #[test]
    fn test_duplicates_kept_unless_deduplicate() {
        let rules = || vec![sync_rule("dup", Fixed(vec![2, 2]))];

        let result = linter(rules(), LinterConfig::new())
            .lint_str("doc.md", "a\nb")
            .unwrap();
        assert_eq!(result.violations.len(), 2);

        let mut config = LinterConfig::new();
        config.deduplicate = true;
        let result = linter(rules(), config).lint_str("doc.md", "a\nb").unwrap();
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn test_failing_and_panicking_rules_are_isolated() {
        let linter = linter(
            vec![
                sync_rule("fails", Failing),
                sync_rule("panics", Panicking),
                sync_rule("works", Fixed(vec![1])),
            ],
            LinterConfig::new(),
        );
        let result = linter.lint_str("doc.md", "text").unwrap();

        assert_eq!(result.violations.len(), 2);
        let failed: Vec<_> = result.failures.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(failed, vec!["fails", "panics"]);
        assert!(matches!(result.failures[1].error, RuleError::Panic(ref m) if m == "rule exploded"));
    }

    #[test]
    fn test_invalid_line_numbers_become_failures() {
        let linter = linter(vec![sync_rule("off-by-one", Fixed(vec![0, 1, 3]))], LinterConfig::new());
        let result = linter.lint_str("doc.md", "a\nb").unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.failures.len(), 2);
        assert!(
            result
                .failures
                .iter()
                .all(|f| matches!(f.error, RuleError::InvalidLineNumber { .. }))
        );
    }

    #[test]
    fn test_missing_parser_is_a_configuration_failure() {
        let text_rule = Rule::sync(
            RuleDescriptor::new(["plain"], "needs text parser")
                .with_tags(["test"])
                .with_parser(ParserKind::Text),
            Fixed(vec![1]),
        )
        .unwrap();
        let mut rules = RuleSet::new();
        rules.register(text_rule).unwrap();
        rules.register(sync_rule("md", Fixed(vec![1]))).unwrap();

        let linter = Linter::with_parsers(
            rules,
            LinterConfig::new(),
            vec![Box::new(MarkdownParser::new())],
        )
        .unwrap();
        let result = linter.lint_str("doc.md", "text").unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule_name, "md");
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(result.failures[0].error, RuleError::Config(_)));
    }

    #[test]
    fn test_disabled_rule_does_not_run() {
        let config = LinterConfig::from_json(r#"{ "options": { "fails": false } }"#).unwrap();
        let linter = linter(vec![sync_rule("fails", Failing)], config);

        let result = linter.lint_str("doc.md", "text").unwrap();
        assert!(result.is_clean());
    }

    #[test]
    fn test_severity_from_config() {
        let config =
            LinterConfig::from_json(r#"{ "options": { "every-n-lines": "warning" } }"#).unwrap();
        let linter = linter(vec![EveryNLines::rule().unwrap()], config);

        let result = linter.lint_str("doc.md", "a\nb").unwrap();
        assert_eq!(result.violations[0].severity, Severity::Warning);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_async_rules_complete_before_aggregation() {
        let async_rule = |name: &str, line: usize| {
            Rule::asynchronous(
                RuleDescriptor::new([name], "async test rule")
                    .with_tags(["test"])
                    .with_asynchronous(true),
                Yielding(line),
            )
            .unwrap()
        };
        let linter = linter(
            vec![
                async_rule("later", 1),
                sync_rule("now", Fixed(vec![2])),
                async_rule("earlier", 1),
            ],
            LinterConfig::new(),
        );

        let result = linter.lint_str("doc.md", "a\nb").unwrap();
        let order: Vec<_> = result
            .violations
            .iter()
            .map(|v| (v.line_number, v.rule_name.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "earlier"), (1, "later"), (2, "now")]);
    }

    #[test]
    fn test_parse_error_fails_pass() {
        let linter = linter(vec![EveryNLines::rule().unwrap()], LinterConfig::new());
        let err = linter.lint_str("doc.md", "bad\0byte").unwrap_err();
        assert!(matches!(err, LinterError::Parse(_)));
    }

    #[test]
    fn test_timings_recorded_when_enabled() {
        let mut config = LinterConfig::new();
        config.timings = true;
        let linter = linter(
            vec![EveryNLines::rule().unwrap(), sync_rule("other", Fixed(vec![]))],
            config,
        );

        let result = linter.lint_str("doc.md", "a").unwrap();
        let rules: Vec<_> = result.timings.iter().map(|t| t.rule.as_str()).collect();
        assert_eq!(rules, vec!["every-n-lines", "other"]);
    }

    #[test]
    fn test_empty_document() {
        let linter = linter(vec![EveryNLines::rule().unwrap()], LinterConfig::new());
        let result = linter.lint_str("empty.md", "").unwrap();
        assert!(result.is_clean());
    }

    #[test]
    fn test_rule_receives_options() {
        struct EchoConfig;

        impl SyncRule for EchoConfig {
            fn lint(&self, params: &RuleParams<'_>, reporter: &Reporter) -> Result<(), RuleError> {
                let line = params.config["line"].as_u64().unwrap_or(1) as usize;
                reporter.report(ErrorInfo::new(line).with_context(params.lines[line - 1]));
                Ok(())
            }
        }

        let config =
            LinterConfig::from_json(r#"{ "options": { "echo": { "line": 2 } } }"#).unwrap();
        let linter = linter(vec![sync_rule("echo", EchoConfig)], config);
        let result = linter.lint_str("doc.md", "first\nsecond").unwrap();

        assert_eq!(result.violations[0].line_number, 2);
        assert_eq!(result.violations[0].context.as_deref(), Some("second"));
    }
}
