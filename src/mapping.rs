//! Entity <-> DTO conversion contract shared by every catalog resource.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::model::Record;

pub trait Mapper: Send + Sync + 'static {
    type Entity: Record;
    type Dto: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn to_dto(&self, entity: Self::Entity) -> Self::Dto;

    /// Build a new entity. Identity and timestamps are generated here and
    /// never taken from the DTO.
    fn to_entity(&self, dto: Self::Dto) -> CatalogResult<Self::Entity>;

    /// Copy the DTO's non-null fields onto `entity`. Identity, ownership and
    /// creation fields are never touched.
    fn merge(&self, dto: Self::Dto, entity: &mut Self::Entity) -> CatalogResult<()>;

    /// Value that must be unique across all records of this type, if any.
    fn unique_key<'a>(&self, _dto: &'a Self::Dto) -> Option<&'a str> {
        None
    }
}

/// Mapper for records nested under a parent.
pub trait ChildMapper: Mapper {
    /// Force the DTO's parent key to the id taken from the request path.
    fn assign_parent(&self, dto: &mut Self::Dto, parent_id: Uuid);
}

pub fn required<T>(value: Option<T>, field: &str) -> CatalogResult<T> {
    value.ok_or_else(|| CatalogError::validation(format!("{field} is required")))
}

/// Required string that must not be blank once trimmed.
pub fn required_text(value: Option<String>, field: &str) -> CatalogResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(CatalogError::validation(format!("{field} is required"))),
    }
}

/// Merge a required string field, rejecting a blank replacement.
pub fn merge_text(target: &mut String, value: Option<String>, field: &str) -> CatalogResult<()> {
    if value.is_some() {
        *target = required_text(value, field)?;
    }
    Ok(())
}

pub fn merge_value<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

pub fn merge_optional<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}
