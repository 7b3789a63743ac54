//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Configuration-time errors raised while resolving a model description.
/// These are caller bugs and surface before any route is mounted.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown field type '{type_name}' for field '{field}'")]
    UnknownType { field: String, type_name: String },
    #[error("field map for model '{0}' must be a JSON object")]
    NotAnObject(String),
    #[error("model '{0}' has no fields")]
    EmptyFieldMap(String),
    #[error("field '{0}' options must carry a string 'type'")]
    InvalidOptions(String),
}

/// Request-time errors. Mapped to bare HTTP status codes: storage and render
/// failures abort the middleware chain with 500, missing lookups with 404.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("template: {0}")]
    Template(#[from] tera::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Schema(_) | AppError::Db(_) | AppError::Template(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request aborted");
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::NotFound("post 42".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_map_to_500() {
        let resp = AppError::Db(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
