//! Route error types.

use routebill_shared::AppError;
use thiserror::Error;

/// Route validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Blank route name.
    #[error("Route name is required.")]
    NameRequired,
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        Self::Validation(err.to_string())
    }
}
