use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{
    merge_optional, merge_text, required, required_text, ChildMapper, Mapper,
};
use crate::model::{now, ChildRecord, Record, TenantRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub category_id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductCategory {
    const ENTITY: &'static str = "product category";
    const SORTABLE: &'static [&'static str] = &["name", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.category_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TenantRecord for ProductCategory {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductCategoryDto {
    pub category_id: Option<Uuid>,
    pub tenant_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryMapper;

impl Mapper for CategoryMapper {
    type Entity = ProductCategory;
    type Dto = ProductCategoryDto;

    fn to_dto(&self, category: ProductCategory) -> ProductCategoryDto {
        ProductCategoryDto {
            category_id: Some(category.category_id),
            tenant_id: Some(category.tenant_id),
            name: Some(category.name),
            description: category.description,
            created_at: Some(category.created_at),
            updated_at: Some(category.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductCategoryDto) -> CatalogResult<ProductCategory> {
        let created_at = now();
        Ok(ProductCategory {
            category_id: Uuid::new_v4(),
            tenant_id: required_text(dto.tenant_id, "tenant_id")?,
            name: required_text(dto.name, "name")?,
            description: dto.description,
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductCategoryDto, category: &mut ProductCategory) -> CatalogResult<()> {
        merge_text(&mut category.name, dto.name, "name")?;
        merge_optional(&mut category.description, dto.description);
        category.updated_at = now();
        Ok(())
    }
}

/// A named subdivision of a category. Subtype names are unique catalog-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSubtype {
    pub subtype_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductSubtype {
    const ENTITY: &'static str = "product subtype";
    const SORTABLE: &'static [&'static str] = &["name", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.subtype_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl ChildRecord for ProductSubtype {
    fn parent_id(&self) -> Uuid {
        self.category_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSubtypeDto {
    pub subtype_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubtypeMapper;

impl Mapper for SubtypeMapper {
    type Entity = ProductSubtype;
    type Dto = ProductSubtypeDto;

    fn to_dto(&self, subtype: ProductSubtype) -> ProductSubtypeDto {
        ProductSubtypeDto {
            subtype_id: Some(subtype.subtype_id),
            category_id: Some(subtype.category_id),
            name: Some(subtype.name),
            description: subtype.description,
            created_at: Some(subtype.created_at),
            updated_at: Some(subtype.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductSubtypeDto) -> CatalogResult<ProductSubtype> {
        let created_at = now();
        Ok(ProductSubtype {
            subtype_id: Uuid::new_v4(),
            category_id: required(dto.category_id, "category_id")?,
            name: required_text(dto.name, "name")?,
            description: dto.description,
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductSubtypeDto, subtype: &mut ProductSubtype) -> CatalogResult<()> {
        merge_text(&mut subtype.name, dto.name, "name")?;
        merge_optional(&mut subtype.description, dto.description);
        subtype.updated_at = now();
        Ok(())
    }

    fn unique_key<'a>(&self, dto: &'a ProductSubtypeDto) -> Option<&'a str> {
        dto.name.as_deref().map(str::trim)
    }
}

impl ChildMapper for SubtypeMapper {
    fn assign_parent(&self, dto: &mut ProductSubtypeDto, category_id: Uuid) {
        dto.category_id = Some(category_id);
    }
}
