//! JSON output formatter

use marklint_core::LintResult;
use miette::{IntoDiagnostic, Result};

pub fn output_json(results: &[LintResult]) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(results).into_diagnostic()?
    );
    Ok(())
}
