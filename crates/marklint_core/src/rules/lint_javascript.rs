//! `lint-javascript`: lints JavaScript code blocks with an external
//! analyzer.

use std::sync::Arc;

use futures_util::future::LocalBoxFuture;
use futures_util::stream::{self, StreamExt};
use marklint_ast::{Token, TokenType};
use marklint_parser::ParserKind;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::analyzer::{AnalyzerConfig, CodeAnalyzer, DEFAULT_DENY_PREFIXES, RuleFilter};
use crate::filter::filter_tokens;
use crate::rule::{
    AsyncRule, ErrorInfo, Reporter, Rule, RuleDefinitionError, RuleDescriptor, RuleError,
    RuleParams,
};

/// Primary name of the rule.
pub const NAME: &str = "lint-javascript";

/// Languages linted when the `languages` option is absent.
pub const DEFAULT_LANGUAGES: &[&str] = &["js", "javascript", "jsx", "mjs", "cjs"];

/// Upper bound on code blocks analyzed at the same time in one document.
pub const MAX_CONCURRENT_BLOCKS: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Options {
    #[serde(default = "default_languages")]
    languages: Vec<String>,
    #[serde(default)]
    allow_prefixes: Option<Vec<String>>,
    #[serde(default)]
    deny_prefixes: Option<Vec<String>>,
}

fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
}

impl Options {
    fn from_config(config: &Value) -> Result<Self, RuleError> {
        let config = match config {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(config).map_err(|e| RuleError::config(e.to_string()))
    }

    fn rule_filter(&self) -> RuleFilter {
        let deny = self.deny_prefixes.clone().unwrap_or_else(|| {
            DEFAULT_DENY_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect()
        });
        RuleFilter::new(self.allow_prefixes.clone().unwrap_or_default(), deny)
    }

    fn lints(&self, fence: &Token<'_>) -> bool {
        fence
            .language()
            .is_some_and(|lang| self.languages.iter().any(|l| l.eq_ignore_ascii_case(lang)))
    }
}

/// Rule that forwards JavaScript fences to a [`CodeAnalyzer`] and reports
/// its findings at document line numbers.
pub struct LintJavascript {
    analyzer: Arc<dyn CodeAnalyzer>,
}

impl LintJavascript {
    /// Creates the rule function around `analyzer`.
    pub fn new(analyzer: Arc<dyn CodeAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Returns the rule's descriptor.
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new([NAME], "Rule that lints JavaScript code")
            .with_tags(["test", "lint", "javascript"])
            .with_parser(ParserKind::Markdown)
            .with_asynchronous(true)
    }

    /// Creates the rule.
    pub fn rule(analyzer: Arc<dyn CodeAnalyzer>) -> Result<Rule, RuleDefinitionError> {
        Rule::asynchronous(Self::descriptor(), Self::new(analyzer))
    }

    /// Analyzes one fence and maps the findings to document lines.
    ///
    /// Analyzer errors are logged and yield no findings.
    async fn check_fence(
        &self,
        params: &RuleParams<'_>,
        fence: &Token<'_>,
        config: &AnalyzerConfig,
    ) -> Vec<ErrorInfo> {
        let messages = match self.analyzer.verify(fence.content, config).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    "Skipping code block at {}:{}: {}",
                    params.name, fence.line_number, e
                );
                return Vec::new();
            }
        };

        messages
            .into_iter()
            .map(|message| {
                let line_number = fence.line_number as usize + message.line;
                let info = ErrorInfo::new(line_number).with_detail(message.message);
                match params.context.line_text(line_number) {
                    Some(text) => info.with_context(text),
                    None => info,
                }
            })
            .collect()
    }
}

impl AsyncRule for LintJavascript {
    fn validate_config(&self, config: &Value) -> Result<(), RuleError> {
        Options::from_config(config).map(|_| ())
    }

    fn lint<'a>(
        &'a self,
        params: RuleParams<'a>,
        reporter: &'a Reporter,
    ) -> LocalBoxFuture<'a, Result<(), RuleError>> {
        Box::pin(async move {
            let options = Options::from_config(params.config)?;

            let fences: Vec<&Token<'_>> = filter_tokens(&params, TokenType::Fence, |fence| {
                options.lints(fence).then_some(fence)
            })
            .into_iter()
            .flatten()
            .collect();
            if fences.is_empty() {
                return Ok(());
            }

            let config = match self.analyzer.resolve_config(params.name).await {
                Ok(config) => options.rule_filter().apply(config),
                Err(e) => {
                    warn!("Skipping code blocks in {}: {}", params.name, e);
                    return Ok(());
                }
            };

            debug!("Linting {} code blocks in {}", fences.len(), params.name);
            let params = &params;
            let config = &config;
            let mut outcomes: Vec<(usize, Vec<ErrorInfo>)> =
                stream::iter(fences.into_iter().enumerate())
                    .map(|(index, fence)| async move {
                        (index, self.check_fence(params, fence, config).await)
                    })
                    .buffer_unordered(MAX_CONCURRENT_BLOCKS)
                    .collect()
                    .await;

            outcomes.sort_by_key(|(index, _)| *index);
            for info in outcomes.into_iter().flat_map(|(_, infos)| infos) {
                reporter.report(info);
            }
            Ok(())
        })
    }
}
