//! Lint command implementation

use marklint_core::Linter;
use miette::{IntoDiagnostic, Result};

use super::{builtin_rules, load_config};
use crate::cli::{Cli, OutputFormat};
use crate::output::output_results;

pub fn run_lint(
    cli: &Cli,
    patterns: &[String],
    format: OutputFormat,
    timings: bool,
) -> Result<bool> {
    let mut config = load_config(cli)?;
    if timings {
        config.timings = true;
    }
    let timings_enabled = config.timings;

    let rules = builtin_rules(&config)?;
    let linter = Linter::new(rules, config).into_diagnostic()?;

    let (results, failures) = linter.lint_patterns(patterns).into_diagnostic()?;

    if !failures.is_empty() {
        eprintln!("\n{} file(s) failed to lint:", failures.len());
        for (path, error) in &failures {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    let has_errors = output_results(&results, format, timings_enabled)?;

    Ok(has_errors || !failures.is_empty())
}
