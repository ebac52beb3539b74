//! Integration tests for the `lint-javascript` rule, driven by a scripted
//! analyzer instead of a real ESLint installation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::LocalBoxFuture;
use marklint_core::analyzer::{AnalyzerConfig, AnalyzerError, AnalyzerMessage, CodeAnalyzer};
use marklint_core::rules::{LintJavascript, MAX_CONCURRENT_BLOCKS};
use marklint_core::{Linter, LinterConfig, RuleSet};
use marklint_parser::physical_lines;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Reports one message per line containing `var`, fails on snippets
/// containing `FAIL`, and records the configurations it was given.
#[derive(Default)]
struct ScriptedAnalyzer {
    seen_configs: Mutex<Vec<AnalyzerConfig>>,
    resolved_for: Mutex<Vec<String>>,
}

impl CodeAnalyzer for ScriptedAnalyzer {
    fn resolve_config<'a>(
        &'a self,
        file: &'a str,
    ) -> LocalBoxFuture<'a, Result<AnalyzerConfig, AnalyzerError>> {
        Box::pin(async move {
            self.resolved_for.lock().unwrap().push(file.to_string());
            Ok(serde_json::from_value(json!({
                "rules": {
                    "no-var": "error",
                    "jsdoc/require-param": "warn",
                    "unicorn/filename-case": "error"
                },
                "env": { "browser": true }
            }))
            .unwrap())
        })
    }

    fn verify<'a>(
        &'a self,
        source: &'a str,
        config: &'a AnalyzerConfig,
    ) -> LocalBoxFuture<'a, Result<Vec<AnalyzerMessage>, AnalyzerError>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.seen_configs.lock().unwrap().push(config.clone());
            if source.contains("FAIL") {
                return Err(AnalyzerError::InvalidOutput("scripted failure".to_string()));
            }
            Ok(physical_lines(source)
                .enumerate()
                .filter(|(_, line)| line.text.contains("var"))
                .map(|(idx, _)| AnalyzerMessage {
                    line: idx + 1,
                    message: "unexpected var".to_string(),
                    rule_id: Some("no-var".to_string()),
                })
                .collect())
        })
    }
}

/// Counts configuration lookups and how many snippets are analyzed at once.
#[derive(Default)]
struct CountingAnalyzer {
    resolves: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    verified: AtomicUsize,
}

impl CodeAnalyzer for CountingAnalyzer {
    fn resolve_config<'a>(
        &'a self,
        _file: &'a str,
    ) -> LocalBoxFuture<'a, Result<AnalyzerConfig, AnalyzerError>> {
        Box::pin(async move {
            self.resolves.fetch_add(1, Ordering::SeqCst);
            Ok(AnalyzerConfig::default())
        })
    }

    fn verify<'a>(
        &'a self,
        _source: &'a str,
        _config: &'a AnalyzerConfig,
    ) -> LocalBoxFuture<'a, Result<Vec<AnalyzerMessage>, AnalyzerError>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.verified.fetch_add(1, Ordering::SeqCst);
            Ok(vec![AnalyzerMessage {
                line: 1,
                message: "checked".to_string(),
                rule_id: None,
            }])
        })
    }
}

fn linter(analyzer: Arc<dyn CodeAnalyzer>, config: LinterConfig) -> Linter {
    let rules = RuleSet::new()
        .with_rule(LintJavascript::rule(analyzer).unwrap())
        .unwrap();
    Linter::new(rules, config).unwrap()
}

const DOCUMENT: &str = "\
# Example

Some text.

More text.

Even more text.

Last paragraph.
```js
let a = 1;
var b = 2;
```
";

#[test]
fn test_findings_are_mapped_to_document_lines() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer.clone(), LinterConfig::new());

    let result = linter.lint_str("README.md", DOCUMENT).unwrap();

    assert!(result.failures.is_empty());
    assert_eq!(result.violations.len(), 1);
    let violation = &result.violations[0];
    // The fence opens on line 10; the analyzer reports line 2 of the snippet.
    assert_eq!(violation.line_number, 12);
    assert_eq!(violation.rule_name, "lint-javascript");
    assert_eq!(violation.detail.as_deref(), Some("unexpected var"));
    assert_eq!(violation.context.as_deref(), Some("var b = 2;"));
    assert_eq!(*analyzer.resolved_for.lock().unwrap(), vec!["README.md"]);
}

#[test]
fn test_denied_rule_prefixes_are_removed() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer.clone(), LinterConfig::new());

    linter.lint_str("README.md", DOCUMENT).unwrap();

    let configs = analyzer.seen_configs.lock().unwrap();
    let rules: Vec<_> = configs[0].rules.keys().cloned().collect();
    assert_eq!(rules, vec!["no-var"]);
    assert_eq!(configs[0].rest["env"], json!({ "browser": true }));
}

#[test]
fn test_only_configured_languages_are_linted() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer.clone(), LinterConfig::new());
    let document = "```python\nvar = 1\n```\n\n```json\n{\"var\": 1}\n```\n\n```\nvar x;\n```\n\n    var indented;\n\n`var inline`\n";

    let result = linter.lint_str("README.md", document).unwrap();

    assert!(result.violations.is_empty());
    assert!(analyzer.seen_configs.lock().unwrap().is_empty());
}

#[test]
fn test_languages_option() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let config = LinterConfig::from_json(
        r#"{ "options": { "lint-javascript": { "languages": ["ts"] } } }"#,
    )
    .unwrap();
    let linter = linter(analyzer, config);

    let result = linter
        .lint_str("README.md", "```js\nvar a;\n```\n\n```TS\nvar b;\n```\n")
        .unwrap();

    let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
    assert_eq!(lines, vec![6]);
}

#[test]
fn test_failing_block_does_not_hide_other_blocks() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer, LinterConfig::new());
    let document = "```js\nvar first;\n```\n\n```js\nFAIL\n```\n\n```javascript\nvar third;\n```\n";

    let result = linter.lint_str("README.md", document).unwrap();

    let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
    assert_eq!(lines, vec![2, 10]);
    assert!(result.failures.is_empty());
}

#[test]
fn test_malformed_options_skip_the_rule() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let config = LinterConfig::from_json(
        r#"{ "options": { "lint-javascript": { "languages": "js" } } }"#,
    )
    .unwrap();
    let linter = linter(analyzer.clone(), config);

    let result = linter.lint_str("README.md", DOCUMENT).unwrap();

    assert!(result.violations.is_empty());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].rule, "lint-javascript");
    assert!(analyzer.resolved_for.lock().unwrap().is_empty());
}

#[test]
fn test_repeated_passes_are_identical() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer, LinterConfig::new());

    let first = linter.lint_str("README.md", DOCUMENT).unwrap();
    let second = linter.lint_str("README.md", DOCUMENT).unwrap();
    assert_eq!(first.violations, second.violations);
}

#[test]
fn test_bare_carriage_returns_map_to_document_lines() {
    let analyzer = Arc::new(ScriptedAnalyzer::default());
    let linter = linter(analyzer, LinterConfig::new());

    let result = linter
        .lint_str("README.md", "x\r\r```js\rlet a;\rvar b;\r```\r")
        .unwrap();

    assert!(result.failures.is_empty());
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].line_number, 5);
    assert_eq!(result.violations[0].context.as_deref(), Some("var b;"));
}

#[test]
fn test_config_resolved_once_and_blocks_bounded() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let linter = linter(analyzer.clone(), LinterConfig::new());
    let document = "```js\nlet a;\n```\n\n".repeat(50);

    let result = linter.lint_str("README.md", &document).unwrap();

    assert_eq!(analyzer.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(analyzer.verified.load(Ordering::SeqCst), 50);
    let peak = analyzer.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= MAX_CONCURRENT_BLOCKS, "peak was {peak}");

    let lines: Vec<_> = result.violations.iter().map(|v| v.line_number).collect();
    let expected: Vec<_> = (0..50).map(|block| block * 4 + 2).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_no_config_lookup_without_javascript_blocks() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let linter = linter(analyzer.clone(), LinterConfig::new());

    let result = linter
        .lint_str("README.md", "# Title\n\n```python\nx = 1\n```\n")
        .unwrap();

    assert!(result.violations.is_empty());
    assert_eq!(analyzer.resolves.load(Ordering::SeqCst), 0);
}
