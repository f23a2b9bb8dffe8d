//! Configuration types deserialized from `loom.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Names of the verification lints that `[verify]` may mention.
pub const KNOWN_RULES: &[&str] = &["unused-value", "undriven-output"];

/// The whole `loom.toml` file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoomConfig {
    /// How results are printed.
    #[serde(default)]
    pub output: OutputConfig,
    /// Lint levels.
    #[serde(default)]
    pub verify: VerifyConfig,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// The `[output]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// `"text"` or `"json"`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Whether terminal output uses ANSI colors.
    #[serde(default = "default_color")]
    pub color: bool,
    /// Column at which diagnostic notes wrap.
    #[serde(default = "default_width")]
    pub width: u16,
}

fn default_format() -> String {
    "text".to_string()
}

fn default_color() -> bool {
    true
}

fn default_width() -> u16 {
    100
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
            width: default_width(),
        }
    }
}

impl OutputConfig {
    /// The parsed output format. Falls back to text for values that did not
    /// pass validation.
    pub fn format(&self) -> OutputFormat {
        self.format.parse().unwrap_or_default()
    }
}

/// What the driver prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Assembly text and rendered diagnostics.
    #[default]
    Text,
    /// A JSON module snapshot and JSON diagnostics.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{other}' (expected \"text\" or \"json\")"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

/// The `[verify]` section.
///
/// Lints are warnings by default; `allow` silences them and `deny` turns
/// them into errors.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Lints that are not reported.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub allow: Vec<String>,
    /// Lints reported as errors.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub deny: Vec<String>,
}

/// The level a lint is reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLevel {
    /// Not reported.
    Allow,
    /// Reported as a warning.
    Warn,
    /// Reported as an error.
    Deny,
}

impl VerifyConfig {
    /// Returns the level configured for `rule`.
    pub fn level(&self, rule: &str) -> RuleLevel {
        if self.deny.iter().any(|r| r == rule) {
            RuleLevel::Deny
        } else if self.allow.iter().any(|r| r == rule) {
            RuleLevel::Allow
        } else {
            RuleLevel::Warn
        }
    }
}

/// The `[log]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// A `tracing` filter directive such as `loom_ir=debug`.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Accepts `allow = "unused-value"` as well as `allow = ["unused-value"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a lint name or a list of lint names")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut rules = Vec::new();
            while let Some(rule) = seq.next_element::<String>()? {
                rules.push(rule);
            }
            Ok(rules)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
