//! Subcommand implementations

pub mod init;
pub mod lint;
pub mod rules;

use std::sync::Arc;

use marklint_core::analyzer::EslintAnalyzer;
use marklint_core::{LinterConfig, RuleSet};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::Cli;

/// Loads the configuration named on the command line, or the one found in
/// the working directory, or the defaults.
pub fn load_config(cli: &Cli) -> Result<LinterConfig> {
    if let Some(ref path) = cli.config {
        return LinterConfig::from_file(path).into_diagnostic();
    }

    if let Some(path) = LinterConfig::discover(".") {
        info!("Using config: {}", path.display());
        return LinterConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(LinterConfig::new())
}

/// Builds the built-in rules, running ESLint from the configuration's
/// directory.
pub fn builtin_rules(config: &LinterConfig) -> Result<RuleSet> {
    let mut analyzer = EslintAnalyzer::new();
    if let Some(ref dir) = config.base_dir {
        analyzer = analyzer.with_working_dir(dir);
    }
    RuleSet::builtin(Arc::new(analyzer)).into_diagnostic()
}
