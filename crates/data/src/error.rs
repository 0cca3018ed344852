//! Data access error types.

use routebill_shared::AppError;
use thiserror::Error;

/// Errors raised at the data-access boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The backend could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with an error body.
    #[error("{message}")]
    Backend {
        /// HTTP status.
        status: u16,
        /// Backend error code (e.g. `23505`, `PGRST116`).
        code: Option<String>,
        /// Backend message.
        message: String,
    },

    /// A response did not have the expected shape.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The requested row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A conditional update matched no row because it changed since it was read.
    #[error("This record was changed since it was loaded. Reload and try again.")]
    StaleWrite,

    /// No handler for a procedure call.
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),
}

impl DataError {
    /// Shorthand for a backend error without a code.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            code: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Transport(msg) => Self::ExternalService(msg),
            DataError::Backend {
                status,
                code,
                message,
            } => match code.as_deref() {
                Some("23505") => Self::Conflict(message),
                Some("23502" | "23514" | "22P02") => Self::Validation(message),
                Some("23503") => Self::BusinessRule(message),
                Some("42501") => Self::Forbidden(message),
                Some("PGRST116") => Self::NotFound(message),
                _ => Self::from_status(status, message),
            },
            DataError::Decode(msg) | DataError::UnknownProcedure(msg) => Self::Internal(msg),
            DataError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            DataError::StaleWrite => Self::Conflict(DataError::StaleWrite.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(409, Some("23505"), "CONFLICT")]
    #[case(400, Some("23514"), "VALIDATION_ERROR")]
    #[case(400, Some("22P02"), "VALIDATION_ERROR")]
    #[case(409, Some("23503"), "BUSINESS_RULE_VIOLATION")]
    #[case(403, Some("42501"), "FORBIDDEN")]
    #[case(406, Some("PGRST116"), "NOT_FOUND")]
    #[case(401, None, "UNAUTHORIZED")]
    #[case(503, None, "DATABASE_ERROR")]
    fn test_backend_codes_map_to_app_errors(
        #[case] status: u16,
        #[case] code: Option<&str>,
        #[case] expected: &str,
    ) {
        let err = DataError::Backend {
            status,
            code: code.map(str::to_string),
            message: "backend said no".into(),
        };
        assert_eq!(AppError::from(err).error_code(), expected);
    }

    #[test]
    fn test_stale_write_is_conflict() {
        let err = AppError::from(DataError::StaleWrite);
        assert_eq!(err.status_code(), 409);
        assert!(err.user_message().contains("Reload"));
    }

    #[test]
    fn test_transport_is_external() {
        let err = AppError::from(DataError::Transport("connection refused".into()));
        assert_eq!(err.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert_eq!(err.user_message(), "connection refused");
    }
}
