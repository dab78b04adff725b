use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::{AppState, ScopedResource, TopLevelResource};
use crate::config::PaginationConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::mapping::Mapper;
use crate::pagination::{Page, PageRequest, SortDirection};

type TopLevelDto<R> = <<R as TopLevelResource>::Mapper as Mapper>::Dto;
type ScopedDto<R> = <<R as ScopedResource>::Mapper as Mapper>::Dto;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Query string accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    /// Only honoured by top-level lists.
    pub tenant_id: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self, config: &PaginationConfig) -> CatalogResult<PageRequest> {
        let request = PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(config.default_page_size),
            config.max_page_size,
        )?;
        match (&self.sort, self.direction) {
            (Some(field), direction) => {
                Ok(request.with_sort(field.clone(), direction.unwrap_or_default()))
            }
            (None, Some(_)) => Err(CatalogError::validation(
                "direction requires a sort field",
            )),
            (None, None) => Ok(request),
        }
    }
}

pub async fn list_records<R: TopLevelResource>(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<TopLevelDto<R>>>, CatalogError> {
    let request = query.page_request(&state.pagination)?;
    let page = R::service(&state)
        .list(query.tenant_id.as_deref(), &request)
        .await?;
    Ok(Json(page))
}

pub async fn create_record<R: TopLevelResource>(
    State(state): State<Arc<AppState>>,
    ApiJson(dto): ApiJson<TopLevelDto<R>>,
) -> Result<(StatusCode, Json<TopLevelDto<R>>), CatalogError> {
    let created = R::service(&state).create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_record<R: TopLevelResource>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TopLevelDto<R>>, CatalogError> {
    Ok(Json(R::service(&state).get(id).await?))
}

/// Serves both PUT and PATCH: fields left out of the body keep their value.
pub async fn update_record<R: TopLevelResource>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(dto): ApiJson<TopLevelDto<R>>,
) -> Result<Json<TopLevelDto<R>>, CatalogError> {
    Ok(Json(R::service(&state).update(id, dto).await?))
}

pub async fn delete_record<R: TopLevelResource>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, CatalogError> {
    R::service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_children<R: ScopedResource>(
    State(state): State<Arc<AppState>>,
    ApiPath(parent_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<ScopedDto<R>>>, CatalogError> {
    let request = query.page_request(&state.pagination)?;
    Ok(Json(R::service(&state).list(parent_id, &request).await?))
}

pub async fn create_child<R: ScopedResource>(
    State(state): State<Arc<AppState>>,
    ApiPath(parent_id): ApiPath<Uuid>,
    ApiJson(dto): ApiJson<ScopedDto<R>>,
) -> Result<(StatusCode, Json<ScopedDto<R>>), CatalogError> {
    let created = R::service(&state).create(parent_id, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_child<R: ScopedResource>(
    State(state): State<Arc<AppState>>,
    ApiPath((parent_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ScopedDto<R>>, CatalogError> {
    Ok(Json(R::service(&state).get(parent_id, id).await?))
}

pub async fn update_child<R: ScopedResource>(
    State(state): State<Arc<AppState>>,
    ApiPath((parent_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(dto): ApiJson<ScopedDto<R>>,
) -> Result<Json<ScopedDto<R>>, CatalogError> {
    Ok(Json(R::service(&state).update(parent_id, id, dto).await?))
}

pub async fn delete_child<R: ScopedResource>(
    State(state): State<Arc<AppState>>,
    ApiPath((parent_id, id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, CatalogError> {
    R::service(&state).delete(parent_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_page_query_defaults_come_from_config() {
        let config = PaginationConfig {
            default_page_size: 15,
            max_page_size: 50,
        };
        let request = PageQuery::default().page_request(&config).unwrap();
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), 15);
        assert!(request.sort().is_none());
    }

    #[test]
    fn test_page_query_limits() {
        let config = PaginationConfig::default();
        let oversized = PageQuery {
            size: Some(config.max_page_size + 1),
            ..Default::default()
        };
        assert_eq!(
            oversized.page_request(&config).unwrap_err().kind(),
            ErrorKind::Validation
        );

        let dangling = PageQuery {
            direction: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert!(dangling.page_request(&config).is_err());

        let sorted = PageQuery {
            sort: Some("name".to_string()),
            direction: Some(SortDirection::Desc),
            ..Default::default()
        };
        let request = sorted.page_request(&config).unwrap();
        let sort = request.sort().unwrap();
        assert_eq!(sort.field, "name");
        assert_eq!(sort.direction, SortDirection::Desc);
    }
}
