use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{
    merge_optional, merge_text, merge_value, required, required_text, ChildMapper, Mapper,
};
use crate::model::{now, ChildRecord, Record, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    #[default]
    Standard,
    Optional,
    Premium,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Standard => "standard",
            FeatureType::Optional => "optional",
            FeatureType::Premium => "premium",
        }
    }
}

impl std::str::FromStr for FeatureType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(FeatureType::Standard),
            "optional" => Ok(FeatureType::Optional),
            "premium" => Ok(FeatureType::Premium),
            other => Err(UnknownVariant {
                kind: "feature type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFeature {
    pub product_feature_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub feature_type: FeatureType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductFeature {
    const ENTITY: &'static str = "product feature";
    const SORTABLE: &'static [&'static str] =
        &["name", "feature_type", "is_active", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_feature_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductFeature {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFeatureDto {
    pub product_feature_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub feature_type: Option<FeatureType>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureMapper;

impl Mapper for FeatureMapper {
    type Entity = ProductFeature;
    type Dto = ProductFeatureDto;

    fn to_dto(&self, feature: ProductFeature) -> ProductFeatureDto {
        ProductFeatureDto {
            product_feature_id: Some(feature.product_feature_id),
            product_id: Some(feature.product_id),
            name: Some(feature.name),
            description: feature.description,
            feature_type: Some(feature.feature_type),
            is_active: Some(feature.is_active),
            created_at: Some(feature.created_at),
            updated_at: Some(feature.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductFeatureDto) -> CatalogResult<ProductFeature> {
        let created_at = now();
        Ok(ProductFeature {
            product_feature_id: Uuid::new_v4(),
            product_id: required(dto.product_id, "product_id")?,
            name: required_text(dto.name, "name")?,
            description: dto.description,
            feature_type: dto.feature_type.unwrap_or_default(),
            is_active: dto.is_active.unwrap_or(true),
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductFeatureDto, feature: &mut ProductFeature) -> CatalogResult<()> {
        merge_text(&mut feature.name, dto.name, "name")?;
        merge_optional(&mut feature.description, dto.description);
        merge_value(&mut feature.feature_type, dto.feature_type);
        merge_value(&mut feature.is_active, dto.is_active);
        feature.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for FeatureMapper {
    fn assign_parent(&self, dto: &mut ProductFeatureDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_touches_supplied_fields() {
        let product_id = Uuid::new_v4();
        let mut feature = FeatureMapper
            .to_entity(ProductFeatureDto {
                product_id: Some(product_id),
                name: Some("Overdraft protection".to_string()),
                feature_type: Some(FeatureType::Optional),
                ..Default::default()
            })
            .unwrap();
        let before = feature.clone();

        FeatureMapper.merge(
            ProductFeatureDto {
                product_feature_id: Some(Uuid::new_v4()),
                product_id: Some(Uuid::new_v4()),
                description: Some("Covers up to 500".to_string()),
                ..Default::default()
            },
            &mut feature,
        )
        .unwrap();

        assert_eq!(feature.product_feature_id, before.product_feature_id);
        assert_eq!(feature.product_id, product_id);
        assert_eq!(feature.created_at, before.created_at);
        assert_eq!(feature.name, before.name);
        assert_eq!(feature.feature_type, FeatureType::Optional);
        assert!(feature.is_active);
        assert_eq!(feature.description.as_deref(), Some("Covers up to 500"));
    }
}
