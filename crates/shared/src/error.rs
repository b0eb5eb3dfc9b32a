//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation (balance, solvency, stock).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 78,
            Self::Validation(_) | Self::BusinessRule(_) => 65,
            Self::NotFound(_) => 66,
            Self::Database(_) => 74,
            Self::Internal(_) => 70,
        }
    }

    /// Returns the error code for structured output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Configuration(String::new()), 78, "CONFIGURATION_ERROR")]
    #[case(AppError::Validation(String::new()), 65, "VALIDATION_ERROR")]
    #[case(AppError::BusinessRule(String::new()), 65, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::NotFound(String::new()), 66, "NOT_FOUND")]
    #[case(AppError::Database(String::new()), 74, "DATABASE_ERROR")]
    #[case(AppError::Internal(String::new()), 70, "INTERNAL_ERROR")]
    fn test_error_codes(#[case] error: AppError, #[case] exit: i32, #[case] code: &str) {
        assert_eq!(error.exit_code(), exit);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::BusinessRule("msg".into()).to_string(),
            "Business rule violation: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
        assert_eq!(
            AppError::Internal("msg".into()).to_string(),
            "Internal error: msg"
        );
    }

    #[test]
    fn test_config_error_maps_to_configuration() {
        let err: AppError = config::ConfigError::Message("missing url".into()).into();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
