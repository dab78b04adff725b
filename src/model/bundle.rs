use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{merge_optional, merge_text, merge_value, required_text, Mapper};
use crate::model::{now, ProductStatus, Record, TenantRecord};

/// A named group of products sold together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBundle {
    pub bundle_id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProductStatus,
    pub product_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductBundle {
    const ENTITY: &'static str = "product bundle";
    const SORTABLE: &'static [&'static str] = &["name", "status", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.bundle_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TenantRecord for ProductBundle {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductBundleDto {
    pub bundle_id: Option<Uuid>,
    pub tenant_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProductStatus>,
    pub product_ids: Option<Vec<Uuid>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BundleMapper;

impl Mapper for BundleMapper {
    type Entity = ProductBundle;
    type Dto = ProductBundleDto;

    fn to_dto(&self, bundle: ProductBundle) -> ProductBundleDto {
        ProductBundleDto {
            bundle_id: Some(bundle.bundle_id),
            tenant_id: Some(bundle.tenant_id),
            name: Some(bundle.name),
            description: bundle.description,
            status: Some(bundle.status),
            product_ids: Some(bundle.product_ids),
            created_at: Some(bundle.created_at),
            updated_at: Some(bundle.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductBundleDto) -> CatalogResult<ProductBundle> {
        let created_at = now();
        Ok(ProductBundle {
            bundle_id: Uuid::new_v4(),
            tenant_id: required_text(dto.tenant_id, "tenant_id")?,
            name: required_text(dto.name, "name")?,
            description: dto.description,
            status: dto.status.unwrap_or_default(),
            product_ids: distinct(dto.product_ids.unwrap_or_default()),
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductBundleDto, bundle: &mut ProductBundle) -> CatalogResult<()> {
        merge_text(&mut bundle.name, dto.name, "name")?;
        merge_optional(&mut bundle.description, dto.description);
        merge_value(&mut bundle.status, dto.status);
        if let Some(ids) = dto.product_ids {
            bundle.product_ids = distinct(ids);
        }
        bundle.updated_at = now();
        Ok(())
    }
}

/// A bundle lists each product once, in first-seen order.
fn distinct(ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.into_iter().unique().collect()
}
