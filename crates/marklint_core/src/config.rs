//! Linter configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LinterError;
use crate::rule::{RuleDescriptor, Severity};

const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// File names searched for by [`LinterConfig::discover`], in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".marklint.jsonc", ".marklint.json"];

/// Configuration for the linter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Whether rules are enabled unless configured otherwise.
    #[serde(default = "default_enabled")]
    pub default: bool,

    /// Rule configuration keyed by rule name or tag.
    #[serde(default)]
    pub options: HashMap<String, RuleOption>,

    /// File patterns to include.
    #[serde(default)]
    pub include: Vec<String>,

    /// File patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether identical violations from one rule on one line are collapsed.
    #[serde(default)]
    pub deduplicate: bool,

    /// Whether to record per-rule timings.
    #[serde(default)]
    pub timings: bool,

    /// Directory containing the configuration file, if loaded from disk.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

/// Configuration for a single rule or tag (in the options map).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleOption {
    /// Rule is enabled/disabled (boolean).
    Enabled(bool),
    /// Rule is enabled with severity string ("error", "warning", "off").
    Severity(String),
    /// Rule is enabled with specific options object.
    Options(Value),
}

impl RuleOption {
    /// Returns whether the rule is enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            RuleOption::Enabled(enabled) => *enabled,
            RuleOption::Severity(s) => s != "off",
            RuleOption::Options(_) => true,
        }
    }

    /// Returns the severity named by this option, if any.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            RuleOption::Severity(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Effective settings of an enabled rule after resolving defaults, tags and
/// names.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    /// Severity stamped on every violation of the rule.
    pub severity: Severity,
    /// Options object passed to the rule (`null` if none).
    pub options: Value,
}

impl LinterConfig {
    /// Creates a new configuration with every rule enabled.
    pub fn new() -> Self {
        Self {
            default: true,
            options: HashMap::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            deduplicate: false,
            timings: false,
            base_dir: None,
        }
    }

    /// Loads configuration from a file.
    ///
    /// Supports `.marklint.jsonc` and `.marklint.json`; comments and
    /// trailing commas are accepted in both.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| LinterError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;
        config.base_dir = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Some(PathBuf::from(".")),
            Some(parent) => Some(parent.to_path_buf()),
            None => None,
        };

        Ok(config)
    }

    /// Looks for a configuration file in `dir`.
    ///
    /// Returns the path of the first existing file from
    /// [`CONFIG_FILE_NAMES`].
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parses configuration from a JSON or JSONC string with schema
    /// validation.
    pub fn from_json(json: &str) -> Result<Self, LinterError> {
        let value = jsonc_parser::parse_to_serde_value(json, &Default::default())
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| Value::Object(Default::default()));

        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("invalid embedded config schema: {}", e))?;
                Validator::new(&schema_json).map_err(|e| format!("invalid config schema: {}", e))
            })
            .as_ref()
            .map_err(|e| LinterError::internal(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(LinterError::config(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))
    }

    /// Resolves the settings for a rule, or `None` if it is disabled.
    ///
    /// The `default` flag applies first, then entries matching one of the
    /// rule's tags, then entries matching one of its names. Keys are
    /// compared case-insensitively.
    pub fn resolve(&self, descriptor: &RuleDescriptor) -> Option<ResolvedRule> {
        let mut resolved = self.default.then(|| ResolvedRule {
            severity: Severity::Error,
            options: Value::Null,
        });

        let keys = descriptor.tags.iter().chain(descriptor.names.iter());
        for key in keys {
            if let Some(option) = self.option(key) {
                resolved = Self::apply(resolved, option);
            }
        }

        resolved
    }

    /// Looks up an options entry by rule name or tag, ignoring case.
    pub fn option(&self, key: &str) -> Option<&RuleOption> {
        self.options.get(key).or_else(|| {
            self.options
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, option)| option)
        })
    }

    fn apply(current: Option<ResolvedRule>, option: &RuleOption) -> Option<ResolvedRule> {
        if !option.is_enabled() {
            return None;
        }

        let mut resolved = current.unwrap_or(ResolvedRule {
            severity: Severity::Error,
            options: Value::Null,
        });
        if let Some(severity) = option.severity() {
            resolved.severity = severity;
        }
        if let RuleOption::Options(value) = option {
            resolved.options = value.clone();
        }
        Some(resolved)
    }

    /// Returns the default configuration file written by `mdlint init`.
    pub fn template() -> &'static str {
        r#"{
  // Enable every rule unless configured otherwise.
  "default": true,
  "options": {
    "every-n-lines": false,
    "lint-javascript": {
      "languages": ["js", "javascript", "jsx", "mjs", "cjs"]
    }
  },
  "include": ["**/*.md"],
  "exclude": ["**/node_modules/**", "**/target/**"],
  "deduplicate": false,
  "timings": false
}
"#
    }
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marklint_parser::ParserKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn descriptor(names: &[&str], tags: &[&str]) -> RuleDescriptor {
        RuleDescriptor::new(names.iter().copied(), "test rule")
            .with_tags(tags.iter().copied())
            .with_parser(ParserKind::Markdown)
    }

    #[test]
    fn test_config_new() {
        let config = LinterConfig::new();
        assert!(config.default);
        assert!(config.options.is_empty());
        assert!(!config.deduplicate);
        assert!(!config.timings);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "options": {
                "every-n-lines": { "n": 3 },
                "lint-javascript": "warning"
            },
            "deduplicate": true
        }"#;

        let config = LinterConfig::from_json(json).unwrap();
        assert_eq!(config.options.len(), 2);
        assert!(config.default);
        assert!(config.deduplicate);
    }

    #[test]
    fn test_config_from_jsonc() {
        let json = r#"{
            // rules that are noisy in this repo
            "options": {
                "every-n-lines": false,
            },
        }"#;

        let config = LinterConfig::from_json(json).unwrap();
        assert_eq!(
            config.option("every-n-lines"),
            Some(&RuleOption::Enabled(false))
        );
    }

    #[test]
    fn test_config_empty_document() {
        let config = LinterConfig::from_json("").unwrap();
        assert!(config.default);
    }

    #[test]
    fn test_rule_option_enabled() {
        assert!(RuleOption::Enabled(true).is_enabled());
        assert!(!RuleOption::Enabled(false).is_enabled());
        assert!(!RuleOption::Severity("off".to_string()).is_enabled());
        assert!(RuleOption::Severity("warning".to_string()).is_enabled());
        assert!(RuleOption::Options(json!({"n": 3})).is_enabled());
    }

    #[test]
    fn test_rule_option_strings_match_schema() {
        assert_eq!(RuleOption::Severity("Warning".to_string()).severity(), None);
        assert_eq!(
            RuleOption::Severity("warning".to_string()).severity(),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn test_resolve_default_enabled() {
        let config = LinterConfig::new();
        let resolved = config.resolve(&descriptor(&["every-n-lines"], &["test"]));

        assert_eq!(
            resolved,
            Some(ResolvedRule {
                severity: Severity::Error,
                options: Value::Null,
            })
        );
    }

    #[test]
    fn test_resolve_default_disabled_enabled_by_tag() {
        let config = LinterConfig::from_json(
            r#"{ "default": false, "options": { "LINT": "warning" } }"#,
        )
        .unwrap();

        let resolved = config
            .resolve(&descriptor(&["lint-javascript"], &["test", "lint"]))
            .unwrap();
        assert_eq!(resolved.severity, Severity::Warning);
        assert!(
            config
                .resolve(&descriptor(&["every-n-lines"], &["test"]))
                .is_none()
        );
    }

    #[test]
    fn test_resolve_name_overrides_tag() {
        let config = LinterConfig::from_json(
            r#"{ "options": { "test": false, "Every-N-Lines": { "n": 4 } } }"#,
        )
        .unwrap();

        let resolved = config
            .resolve(&descriptor(&["every-n-lines"], &["test"]))
            .unwrap();
        assert_eq!(resolved.options, json!({"n": 4}));
        assert!(config.resolve(&descriptor(&["other"], &["test"])).is_none());
    }

    #[test]
    fn test_resolve_name_disables() {
        let config =
            LinterConfig::from_json(r#"{ "options": { "every-n-lines": "off" } }"#).unwrap();
        assert!(
            config
                .resolve(&descriptor(&["every-n-lines"], &["test"]))
                .is_none()
        );
    }

    #[test]
    fn test_discover_prefers_jsonc() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(".marklint.json"), "{}").unwrap();
        fs::write(temp_dir.path().join(".marklint.jsonc"), "{}").unwrap();

        let found = LinterConfig::discover(temp_dir.path()).unwrap();
        assert!(found.ends_with(".marklint.jsonc"));
    }

    #[test]
    fn test_from_file_sets_base_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".marklint.json");
        fs::write(&path, r#"{ "timings": true }"#).unwrap();

        let config = LinterConfig::from_file(&path).unwrap();
        assert!(config.timings);
        assert_eq!(config.base_dir.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_template_is_valid() {
        let config = LinterConfig::from_json(LinterConfig::template()).unwrap();
        assert!(!config.include.is_empty());
    }

    #[rstest]
    #[case::unknown_property(r#"{ "ruless": {} }"#, "Config validation failed")]
    #[case::type_mismatch(r#"{ "timings": "yes" }"#, "Config validation failed")]
    #[case::invalid_severity(
        r#"{ "options": { "every-n-lines": "fatal" } }"#,
        "Config validation failed"
    )]
    #[case::abbreviated_severity(
        r#"{ "options": { "every-n-lines": "warn" } }"#,
        "Config validation failed"
    )]
    #[case::capitalized_off(
        r#"{ "options": { "every-n-lines": "Off" } }"#,
        "Config validation failed"
    )]
    #[case::invalid_include(r#"{ "include": "docs" }"#, "Config validation failed")]
    #[case::broken_json(r#"{ "options": "#, "Invalid JSON")]
    fn test_config_validation_errors(#[case] json: &str, #[case] expected_error_part: &str) {
        let result = LinterConfig::from_json(json);
        assert!(result.is_err(), "Expected error for JSON: {}", json);
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains(expected_error_part),
            "Error message '{}' should contain '{}'",
            err,
            expected_error_part
        );
    }
}
