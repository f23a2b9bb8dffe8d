//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating `loom.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value parsed but is not acceptable.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 2".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 2"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("unknown output format 'xml'".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: unknown output format 'xml'"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConfigError = io_err.into();
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
