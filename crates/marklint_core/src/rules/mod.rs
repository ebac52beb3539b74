//! Built-in rules.

mod every_n_lines;
mod lint_javascript;

use std::sync::Arc;

pub use every_n_lines::EveryNLines;
pub use lint_javascript::{DEFAULT_LANGUAGES, LintJavascript, MAX_CONCURRENT_BLOCKS};

use crate::analyzer::CodeAnalyzer;
use crate::rule::{RuleDefinitionError, RuleSet};

impl RuleSet {
    /// Creates a rule set holding the built-in rules.
    ///
    /// `analyzer` backs `lint-javascript`.
    pub fn builtin(analyzer: Arc<dyn CodeAnalyzer>) -> Result<Self, RuleDefinitionError> {
        RuleSet::new()
            .with_rule(EveryNLines::rule()?)?
            .with_rule(LintJavascript::rule(analyzer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::EslintAnalyzer;

    #[test]
    fn test_builtin_rules() {
        let rules = RuleSet::builtin(Arc::new(EslintAnalyzer::new())).unwrap();

        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["every-n-lines", "lint-javascript"]);
        assert!(rules.get("LINT-JAVASCRIPT").unwrap().function().is_async());
    }
}
