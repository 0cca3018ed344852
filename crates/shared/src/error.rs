//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every failure an operator action can hit ends up here and is shown as a
/// transient notice. None of them are fatal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session rejected by the backend.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Row-level policy denied the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pre-flight validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation (e.g. inactivating a customer with invoices).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (duplicate entry or a row changed since it was read).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend rejected the request.
    #[error("Database error: {0}")]
    Database(String),

    /// The backend could not be reached.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps an HTTP status returned by the backend to an error variant.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::Validation(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 | 406 => Self::NotFound(message),
            409 | 412 => Self::Conflict(message),
            500..=599 => Self::Database(message),
            _ => Self::ExternalService(message),
        }
    }

    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the text shown to the operator in a notice.
    ///
    /// Validation and business-rule messages are already phrased for the
    /// operator, so they are returned without the category prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::BusinessRule(msg) => msg.clone(),
            Self::Unauthorized(_) => "Your session has expired. Sign in again.".to_string(),
            Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Database(msg)
            | Self::ExternalService(msg)
            | Self::Internal(msg) => {
                if msg.trim().is_empty() {
                    self.to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}

impl From<crate::types::InvalidDateRange> for AppError {
    fn from(err: crate::types::InvalidDateRange) -> Self {
        Self::Validation(err.to_string())
    }
}
