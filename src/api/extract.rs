//! Wrappers around axum's `Json`, `Path` and `Query` extractors whose
//! rejections render as the usual `{"error": ...}` body.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::CatalogError;

/// Client mistakes become Validation (400); extractor misuse stays Unexpected.
fn rejected(status: StatusCode, message: String) -> CatalogError {
    if status.is_server_error() {
        CatalogError::Unexpected {
            context: "Failed to extract request".to_string(),
            source: anyhow::anyhow!(message).into(),
        }
    } else {
        CatalogError::validation(message)
    }
}

pub struct ApiJson<T>(pub T);

pub struct ApiPath<T>(pub T);

pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::PageQuery;
    use crate::error::ErrorKind;
    use axum::body::Body;

    #[tokio::test]
    async fn test_malformed_json_is_a_validation_error() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "Checking""#))
            .unwrap();

        let err = ApiJson::<serde_json::Value>::from_request(request, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_negative_page_is_a_validation_error() {
        let request = Request::builder()
            .uri("/products?page=-1")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let err = ApiQuery::<PageQuery>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let request = Request::builder()
            .uri("/products?page=2&size=5")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let ApiQuery(query) = ApiQuery::<PageQuery>::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.size, Some(5));
    }

    #[test]
    fn test_server_side_rejections_stay_unexpected() {
        let err = rejected(StatusCode::INTERNAL_SERVER_ERROR, "no path params".to_string());
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        let err = rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field `name`".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
