//! ESLint adapter.
//!
//! ESLint runs as a child process. Configuration is resolved with
//! `--print-config`, snippets are verified over stdin with the resolved
//! configuration written to a temporary file.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Output, Stdio};

use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{AnalyzerConfig, AnalyzerError, AnalyzerMessage, CodeAnalyzer};

/// One entry of ESLint's `--format json` output.
#[derive(Debug, Deserialize)]
struct FileReport {
    #[serde(default)]
    messages: Vec<AnalyzerMessage>,
}

/// Runs the `eslint` executable.
#[derive(Debug, Clone)]
pub struct EslintAnalyzer {
    program: String,
    working_dir: Option<PathBuf>,
    stdin_filename: String,
}

impl EslintAnalyzer {
    /// Creates an analyzer that runs `eslint` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: "eslint".to_string(),
            working_dir: None,
            stdin_filename: "snippet.js".to_string(),
        }
    }

    /// Uses another executable, e.g. `node_modules/.bin/eslint`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Runs ESLint from `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the file name ESLint reports for snippets read from stdin.
    pub fn with_stdin_filename(mut self, name: impl Into<String>) -> Self {
        self.stdin_filename = name.into();
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .env("ESLINT_USE_FLAT_CONFIG", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> AnalyzerError {
        AnalyzerError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    /// ESLint exits with 1 when it reports problems and 2 on fatal errors.
    fn check_status(&self, output: &Output, accepted: &[i32]) -> Result<(), AnalyzerError> {
        match output.status.code() {
            Some(code) if accepted.contains(&code) => Ok(()),
            _ => Err(AnalyzerError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    async fn print_config(&self, file: &str) -> Result<AnalyzerConfig, AnalyzerError> {
        debug!("Resolving ESLint config for {}", file);
        let output = self
            .command()
            .arg("--print-config")
            .arg(file)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        self.check_status(&output, &[0])?;

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalyzerError::InvalidOutput(e.to_string()))
    }

    async fn lint_stdin(
        &self,
        source: &str,
        config: &AnalyzerConfig,
    ) -> Result<Vec<AnalyzerMessage>, AnalyzerError> {
        let mut config_file = tempfile::Builder::new()
            .prefix("marklint-eslint-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut config_file, config)
            .map_err(|e| AnalyzerError::InvalidOutput(e.to_string()))?;
        config_file.flush()?;

        let mut child = self
            .command()
            .arg("--no-eslintrc")
            .arg("--config")
            .arg(config_file.path())
            .arg("--stdin")
            .arg("--stdin-filename")
            .arg(&self.stdin_filename)
            .arg("--format")
            .arg("json")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        self.check_status(&output, &[0, 1])?;

        let reports: Vec<FileReport> = serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalyzerError::InvalidOutput(e.to_string()))?;
        Ok(reports.into_iter().flat_map(|r| r.messages).collect())
    }
}

impl Default for EslintAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeAnalyzer for EslintAnalyzer {
    fn resolve_config<'a>(
        &'a self,
        file: &'a str,
    ) -> LocalBoxFuture<'a, Result<AnalyzerConfig, AnalyzerError>> {
        Box::pin(self.print_config(file))
    }

    fn verify<'a>(
        &'a self,
        source: &'a str,
        config: &'a AnalyzerConfig,
    ) -> LocalBoxFuture<'a, Result<Vec<AnalyzerMessage>, AnalyzerError>> {
        Box::pin(self.lint_stdin(source, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_json_format() {
        let output = r#"[{
            "filePath": "snippet.js",
            "messages": [
                { "ruleId": "no-var", "severity": 2, "message": "Unexpected var, use let or const instead.", "line": 2, "column": 1 }
            ],
            "errorCount": 1
        }]"#;

        let reports: Vec<FileReport> = serde_json::from_str(output).unwrap();
        let messages: Vec<_> = reports.into_iter().flat_map(|r| r.messages).collect();
        assert_eq!(
            messages,
            vec![AnalyzerMessage {
                line: 2,
                message: "Unexpected var, use let or const instead.".to_string(),
                rule_id: Some("no-var".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let analyzer = EslintAnalyzer::new().with_program("marklint-no-such-eslint-binary");

        let err = analyzer.resolve_config("README.md").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Spawn { .. }));

        let err = analyzer
            .verify("var a = 1;", &AnalyzerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Spawn { .. }));
    }
}
