//! `every-n-lines`: reports every N-th line.

use marklint_parser::ParserKind;
use serde_json::Value;

use crate::line_metadata::{for_each_line, get_line_metadata};
use crate::rule::{
    ErrorInfo, Reporter, Rule, RuleDefinitionError, RuleDescriptor, RuleError, RuleParams,
    SyncRule,
};

/// Primary name of the rule.
pub const NAME: &str = "every-n-lines";

const DEFAULT_PERIOD: usize = 2;

/// Rule that reports an error on each line whose number is a multiple of
/// the `n` option.
///
/// `n` defaults to 2; anything other than a positive integer also falls
/// back to 2.
#[derive(Debug, Default)]
pub struct EveryNLines;

impl EveryNLines {
    /// Returns the rule's descriptor.
    pub fn descriptor() -> RuleDescriptor {
        RuleDescriptor::new([NAME], "Rule that reports an error every N lines")
            .with_tags(["test"])
            .with_parser(ParserKind::Markdown)
    }

    /// Creates the rule.
    pub fn rule() -> Result<Rule, RuleDefinitionError> {
        Rule::sync(Self::descriptor(), EveryNLines)
    }

    fn period(config: &Value) -> usize {
        let n = config.get("n");
        n.and_then(Value::as_u64)
            .or_else(|| {
                n.and_then(Value::as_f64)
                    .filter(|f| f.fract() == 0.0 && *f >= 1.0)
                    .map(|f| f as u64)
            })
            .filter(|&n| n > 0)
            .map_or(DEFAULT_PERIOD, |n| n as usize)
    }
}

impl SyncRule for EveryNLines {
    fn validate_config(&self, config: &Value) -> Result<(), RuleError> {
        match config {
            Value::Null | Value::Object(_) => Ok(()),
            other => Err(RuleError::config(format!(
                "expected an options object, found {}",
                other
            ))),
        }
    }

    fn lint(&self, params: &RuleParams<'_>, reporter: &Reporter) -> Result<(), RuleError> {
        let n = Self::period(params.config);
        for_each_line(get_line_metadata(params), |_, index| {
            let line_number = index + 1;
            if line_number % n == 0 {
                reporter.report(
                    ErrorInfo::new(line_number).with_detail(format!("Line number {}", line_number)),
                );
            }
        });
        Ok(())
    }
}
