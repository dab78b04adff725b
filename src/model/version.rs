use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{
    merge_optional, merge_text, merge_value, required, required_text, ChildMapper, Mapper,
};
use crate::model::{now, ChildRecord, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVersion {
    pub product_version_id: Uuid,
    pub product_id: Uuid,
    pub version_label: String,
    pub change_summary: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductVersion {
    const ENTITY: &'static str = "product version";
    const SORTABLE: &'static [&'static str] =
        &["version_label", "effective_date", "is_current", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_version_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductVersion {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductVersionDto {
    pub product_version_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub version_label: Option<String>,
    pub change_summary: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionMapper;

impl Mapper for VersionMapper {
    type Entity = ProductVersion;
    type Dto = ProductVersionDto;

    fn to_dto(&self, version: ProductVersion) -> ProductVersionDto {
        ProductVersionDto {
            product_version_id: Some(version.product_version_id),
            product_id: Some(version.product_id),
            version_label: Some(version.version_label),
            change_summary: version.change_summary,
            effective_date: version.effective_date,
            is_current: Some(version.is_current),
            created_at: Some(version.created_at),
            updated_at: Some(version.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductVersionDto) -> CatalogResult<ProductVersion> {
        let created_at = now();
        Ok(ProductVersion {
            product_version_id: Uuid::new_v4(),
            product_id: required(dto.product_id, "product_id")?,
            version_label: required_text(dto.version_label, "version_label")?,
            change_summary: dto.change_summary,
            effective_date: dto.effective_date,
            is_current: dto.is_current.unwrap_or(false),
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductVersionDto, version: &mut ProductVersion) -> CatalogResult<()> {
        merge_text(&mut version.version_label, dto.version_label, "version_label")?;
        merge_optional(&mut version.change_summary, dto.change_summary);
        merge_optional(&mut version.effective_date, dto.effective_date);
        merge_value(&mut version.is_current, dto.is_current);
        version.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for VersionMapper {
    fn assign_parent(&self, dto: &mut ProductVersionDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}
