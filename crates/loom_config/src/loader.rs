//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{LoomConfig, OutputFormat, KNOWN_RULES};
use std::path::Path;

/// The file looked up by [`discover_config`].
pub const CONFIG_FILE_NAME: &str = "loom.toml";

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<LoomConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Loads `<dir>/loom.toml` if it exists, and the defaults otherwise.
pub fn discover_config(dir: &Path) -> Result<LoomConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        load_config(&path)
    } else {
        Ok(LoomConfig::default())
    }
}

/// Parses and validates configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<LoomConfig, ConfigError> {
    let config: LoomConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &LoomConfig) -> Result<(), ConfigError> {
    config
        .output
        .format
        .parse::<OutputFormat>()
        .map_err(ConfigError::ValidationError)?;
    if config.output.width == 0 {
        return Err(ConfigError::ValidationError(
            "output.width must be positive".to_string(),
        ));
    }
    let verify = &config.verify;
    for rule in verify.allow.iter().chain(&verify.deny) {
        if !KNOWN_RULES.contains(&rule.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown lint '{rule}' (known: {})",
                KNOWN_RULES.join(", ")
            )));
        }
    }
    if let Some(rule) = verify.allow.iter().find(|r| verify.deny.contains(r)) {
        return Err(ConfigError::ValidationError(format!(
            "lint '{rule}' is both allowed and denied"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleLevel;
    use std::io::Write;

    #[test]
    fn empty_file_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, LoomConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[output]
format = "json"
color = false
width = 72

[verify]
allow = ["unused-value"]
deny = "undriven-output"

[log]
filter = "loom_ir=debug"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.output.format(), OutputFormat::Json);
        assert!(!config.output.color);
        assert_eq!(config.output.width, 72);
        assert_eq!(config.verify.level("unused-value"), RuleLevel::Allow);
        assert_eq!(config.verify.level("undriven-output"), RuleLevel::Deny);
        assert_eq!(config.log.filter.as_deref(), Some("loom_ir=debug"));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config = load_config_from_str("[output]\ncolor = false\n").unwrap();
        assert_eq!(config.output.format(), OutputFormat::Text);
        assert_eq!(config.output.width, 100);
    }

    #[test]
    fn unknown_format_rejected() {
        let err = load_config_from_str("[output]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_width_rejected() {
        let err = load_config_from_str("[output]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_rule_rejected() {
        let err = load_config_from_str("[verify]\ndeny = [\"W999\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn allow_and_deny_conflict() {
        let toml = "[verify]\nallow = [\"unused-value\"]\ndeny = [\"unused-value\"]\n";
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains("unused-value")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("[output\nformat = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn wrong_type_errors() {
        let err = load_config_from_str("[output]\nwidth = \"wide\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn discover_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert_eq!(config, LoomConfig::default());
    }

    #[test]
    fn discover_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[output]\nformat = \"json\"").unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert_eq!(config.output.format(), OutputFormat::Json);
    }

    #[test]
    fn explicit_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
