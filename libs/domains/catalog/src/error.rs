use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Message returned to clients when an error has no recognizable shape.
/// The real cause is logged server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "unexpected error, check server logs";

#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product matched the given lookup term (id, title, or slug)
    #[error("Product with term '{0}' not found")]
    NotFound(String),

    /// A unique constraint rejected the write; the detail comes from storage
    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unclassified failure; the detail is logged, not exposed
    #[error("{INTERNAL_ERROR_MESSAGE}")]
    Internal,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(term) => {
                AppError::NotFound(format!("Product with term '{}' not found", term))
            }
            CatalogError::Duplicate(detail) => AppError::Conflict(detail),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Internal => {
                AppError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        // Convert to AppError for standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
