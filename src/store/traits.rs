use anyhow::Result;
use uuid::Uuid;

use crate::model::{
    ChildRecord, Product, ProductBundle, ProductCategory, ProductConfiguration,
    ProductDocumentationRequirement, ProductFeature, ProductLocalization, ProductRelationship,
    ProductSubtype, ProductVersion, Record, TenantRecord,
};
use crate::pagination::PageSpec;

/// Constraint failures a store reports inside its `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum StoreConflict {
    #[error("unique constraint `{0}` violated")]
    Unique(String),
    #[error("row is still referenced through `{0}`")]
    Referenced(String),
}

/// Per-row access to one entity table. Absence is `Ok(None)`, never an error.
#[async_trait::async_trait]
pub trait EntityStore<E: Record>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>>;
    /// Insert or update by id, returning the row as stored.
    async fn save(&self, entity: E) -> Result<E>;
    /// Rewrite an existing row, returning it as stored. Never inserts:
    /// `Ok(None)` when the row is gone.
    async fn update(&self, entity: E) -> Result<Option<E>>;
    /// Delete exactly this row. Returns false when nothing matched.
    async fn delete(&self, entity: &E) -> Result<bool>;
    async fn exists_by_unique_key(&self, key: &str) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait ChildStore<E: ChildRecord>: EntityStore<E> {
    async fn find_by_parent_id(&self, parent_id: Uuid, page: &PageSpec) -> Result<Vec<E>>;
    async fn count_by_parent_id(&self, parent_id: Uuid) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait TenantStore<E: TenantRecord>: EntityStore<E> {
    /// Page through records, optionally restricted to one tenant.
    async fn find_page(&self, tenant_id: Option<&str>, page: &PageSpec) -> Result<Vec<E>>;
    async fn count(&self, tenant_id: Option<&str>) -> Result<u64>;
}

pub trait CatalogStore:
    TenantStore<Product>
    + TenantStore<ProductCategory>
    + TenantStore<ProductBundle>
    + ChildStore<ProductSubtype>
    + ChildStore<ProductFeature>
    + ChildStore<ProductVersion>
    + ChildStore<ProductLocalization>
    + ChildStore<ProductRelationship>
    + ChildStore<ProductConfiguration>
    + ChildStore<ProductDocumentationRequirement>
    + Send
    + Sync
{
}

impl<T> CatalogStore for T where
    T: TenantStore<Product>
        + TenantStore<ProductCategory>
        + TenantStore<ProductBundle>
        + ChildStore<ProductSubtype>
        + ChildStore<ProductFeature>
        + ChildStore<ProductVersion>
        + ChildStore<ProductLocalization>
        + ChildStore<ProductRelationship>
        + ChildStore<ProductConfiguration>
        + ChildStore<ProductDocumentationRequirement>
        + Send
        + Sync
{
}
