use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{merge_optional, merge_text, merge_value, required_text, Mapper};
use crate::model::{now, ProductStatus, Record, TenantRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: ProductStatus,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Product {
    const ENTITY: &'static str = "product";
    const SORTABLE: &'static [&'static str] = &[
        "name",
        "status",
        "effective_date",
        "expiration_date",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.product_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TenantRecord for Product {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// Wire shape for products, used for create, update and responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDto {
    pub product_id: Option<Uuid>,
    pub tenant_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductMapper;

impl Mapper for ProductMapper {
    type Entity = Product;
    type Dto = ProductDto;

    fn to_dto(&self, product: Product) -> ProductDto {
        ProductDto {
            product_id: Some(product.product_id),
            tenant_id: Some(product.tenant_id),
            name: Some(product.name),
            description: product.description,
            category_id: product.category_id,
            status: Some(product.status),
            effective_date: product.effective_date,
            expiration_date: product.expiration_date,
            created_at: Some(product.created_at),
            updated_at: Some(product.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductDto) -> CatalogResult<Product> {
        let created_at = now();
        Ok(Product {
            product_id: Uuid::new_v4(),
            tenant_id: required_text(dto.tenant_id, "tenant_id")?,
            name: required_text(dto.name, "name")?,
            description: dto.description,
            category_id: dto.category_id,
            status: dto.status.unwrap_or_default(),
            effective_date: dto.effective_date,
            expiration_date: dto.expiration_date,
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductDto, product: &mut Product) -> CatalogResult<()> {
        merge_text(&mut product.name, dto.name, "name")?;
        merge_optional(&mut product.description, dto.description);
        merge_optional(&mut product.category_id, dto.category_id);
        merge_value(&mut product.status, dto.status);
        merge_optional(&mut product.effective_date, dto.effective_date);
        merge_optional(&mut product.expiration_date, dto.expiration_date);
        product.updated_at = now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_requires_tenant() {
        let dto = ProductDto {
            name: Some("Checking".to_string()),
            ..Default::default()
        };
        let err = ProductMapper.to_entity(dto).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("tenant_id"));
    }

    #[test]
    fn test_create_ignores_client_identity() {
        let forged = Uuid::new_v4();
        let dto = ProductDto {
            product_id: Some(forged),
            tenant_id: Some("T1".to_string()),
            name: Some("Checking".to_string()),
            ..Default::default()
        };
        let product = ProductMapper.to_entity(dto).unwrap();
        assert_ne!(product.product_id, forged);
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_merge_keeps_tenant_and_identity() {
        let mut product = ProductMapper
            .to_entity(ProductDto {
                tenant_id: Some("T1".to_string()),
                name: Some("Checking".to_string()),
                ..Default::default()
            })
            .unwrap();
        let original = product.clone();

        ProductMapper.merge(
            ProductDto {
                product_id: Some(Uuid::new_v4()),
                tenant_id: Some("T2".to_string()),
                status: Some(ProductStatus::Active),
                created_at: Some(Utc::now() - chrono::Duration::days(30)),
                ..Default::default()
            },
            &mut product,
        )
        .unwrap();

        assert_eq!(product.product_id, original.product_id);
        assert_eq!(product.tenant_id, "T1");
        assert_eq!(product.created_at, original.created_at);
        assert_eq!(product.name, "Checking");
        assert_eq!(product.status, ProductStatus::Active);
    }
}
