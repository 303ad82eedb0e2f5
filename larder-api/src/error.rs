use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use larder_catalog::CatalogError;
use larder_core::RepositoryError;

/// HTTP-facing error with its status mapping. Everything the repository
/// layer reports lands in one of these; storage failures are logged and
/// hidden behind a generic 500 body.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => ApiError::Validation(e.to_string()),
            RepositoryError::NotFound(what) => ApiError::NotFound(what),
            RepositoryError::AlreadyExists(what) => ApiError::Conflict(what),
            RepositoryError::InsufficientStock { .. } => ApiError::Conflict(err.to_string()),
            RepositoryError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal server error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_expected_statuses() {
        let cases = [
            (
                RepositoryError::Validation(CatalogError::NameRequired),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::NotFound("product PROD-001".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                RepositoryError::InsufficientStock { boxes: -1, units: 0 },
                StatusCode::CONFLICT,
            ),
            (
                RepositoryError::Storage("list_products: down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn storage_detail_is_not_leaked() {
        let response =
            ApiError::from(RepositoryError::Storage("secret dsn".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret dsn"));
    }
}
