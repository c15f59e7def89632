//! Error types for cluepath-core.
//!
//! Reconstruction itself never fails: cycles, dangling branches and the path
//! cap are reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s. The
//! errors here cover parsing UI selections, loading configuration and reading
//! clue documents.

use thiserror::Error;

/// Domain-specific errors for cluepath operations.
#[derive(Error, Debug)]
pub enum CluePathError {
    /// A stage name outside `prepare`, `recall`, `expand`, `rerank`.
    #[error("Unknown stage `{0}`. Use one of: prepare, recall, expand, rerank.")]
    UnknownStage(String),

    /// A display mode other than `full` or `simplified`.
    #[error("Unknown display mode `{0}`. Use `full` or `simplified`.")]
    UnknownDisplayMode(String),

    /// A configuration value is invalid.
    ///
    /// Used for validation errors detected after parsing (e.g., maxPaths=0).
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("Config invalid: {0}")]
    InvalidConfig(String),

    /// The clue document could not be read or parsed.
    #[error("Invalid clue input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CluePathError {
    /// Short hint shown by the CLI beneath the error message, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::UnknownStage(_) => {
                Some("Pass --stage once per stage, e.g. --stage recall --stage expand")
            }
            Self::UnknownDisplayMode(_) => Some("Pass --mode full or --mode simplified"),
            Self::InvalidConfiguration { hint, .. } => Some(hint.as_str()),
            Self::InvalidConfig(_) => Some("Check your config at ~/.cluepath/config.yaml"),
            Self::InvalidInput(_) => {
                Some("Expected a JSON array of clues or an object with a `clues` array")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stage_message() {
        let err = CluePathError::UnknownStage("retrieve".to_string());
        assert!(err.to_string().contains("`retrieve`"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_invalid_configuration_hint_passthrough() {
        let err = CluePathError::InvalidConfiguration {
            message: "reconstruction.maxPaths cannot be 0".to_string(),
            hint: "Set maxPaths to at least 1".to_string(),
        };
        assert_eq!(err.hint(), Some("Set maxPaths to at least 1"));
        assert!(err.to_string().starts_with("Invalid configuration:"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CluePathError = parse.unwrap_err().into();
        assert!(matches!(err, CluePathError::Json(_)));
        assert!(err.hint().is_none());
    }
}
