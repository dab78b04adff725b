use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::CatalogError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub fn status_for(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Conflict(_) => StatusCode::CONFLICT,
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = match &self {
            CatalogError::Unexpected { context, source } => {
                log::error!("{context}: {source:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let not_found = CatalogError::not_found("product", Uuid::nil());
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&CatalogError::conflict("taken")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&CatalogError::validation("name is required")),
            StatusCode::BAD_REQUEST
        );
        let unexpected = CatalogError::from_store("Failed to fetch product", anyhow::anyhow!("boom"));
        assert_eq!(status_for(&unexpected), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unexpected_cause_is_hidden() {
        let err = CatalogError::from_store(
            "Failed to fetch product",
            anyhow::anyhow!("password authentication failed for user catalog"),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "internal server error");
    }
}
