use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::mapping::{merge_optional, merge_value, required, ChildMapper, Mapper};
use crate::model::{now, ChildRecord, Record, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Complement,
    Substitute,
    Upgrade,
    Downgrade,
    Prerequisite,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Complement => "complement",
            RelationshipType::Substitute => "substitute",
            RelationshipType::Upgrade => "upgrade",
            RelationshipType::Downgrade => "downgrade",
            RelationshipType::Prerequisite => "prerequisite",
        }
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complement" => Ok(RelationshipType::Complement),
            "substitute" => Ok(RelationshipType::Substitute),
            "upgrade" => Ok(RelationshipType::Upgrade),
            "downgrade" => Ok(RelationshipType::Downgrade),
            "prerequisite" => Ok(RelationshipType::Prerequisite),
            other => Err(UnknownVariant {
                kind: "relationship type",
                value: other.to_string(),
            }),
        }
    }
}

/// Directed link from the owning product to another product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRelationship {
    pub product_relationship_id: Uuid,
    pub product_id: Uuid,
    pub related_product_id: Uuid,
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductRelationship {
    const ENTITY: &'static str = "product relationship";
    const SORTABLE: &'static [&'static str] = &["relationship_type", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_relationship_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductRelationship {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRelationshipDto {
    pub product_relationship_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub related_product_id: Option<Uuid>,
    pub relationship_type: Option<RelationshipType>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipMapper;

impl Mapper for RelationshipMapper {
    type Entity = ProductRelationship;
    type Dto = ProductRelationshipDto;

    fn to_dto(&self, relationship: ProductRelationship) -> ProductRelationshipDto {
        ProductRelationshipDto {
            product_relationship_id: Some(relationship.product_relationship_id),
            product_id: Some(relationship.product_id),
            related_product_id: Some(relationship.related_product_id),
            relationship_type: Some(relationship.relationship_type),
            description: relationship.description,
            created_at: Some(relationship.created_at),
            updated_at: Some(relationship.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductRelationshipDto) -> CatalogResult<ProductRelationship> {
        let product_id = required(dto.product_id, "product_id")?;
        let related_product_id = required(dto.related_product_id, "related_product_id")?;
        check_not_self(product_id, related_product_id)?;
        let created_at = now();
        Ok(ProductRelationship {
            product_relationship_id: Uuid::new_v4(),
            product_id,
            related_product_id,
            relationship_type: required(dto.relationship_type, "relationship_type")?,
            description: dto.description,
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(
        &self,
        dto: ProductRelationshipDto,
        relationship: &mut ProductRelationship,
    ) -> CatalogResult<()> {
        if let Some(related) = dto.related_product_id {
            check_not_self(relationship.product_id, related)?;
            relationship.related_product_id = related;
        }
        merge_value(&mut relationship.relationship_type, dto.relationship_type);
        merge_optional(&mut relationship.description, dto.description);
        relationship.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for RelationshipMapper {
    fn assign_parent(&self, dto: &mut ProductRelationshipDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}

fn check_not_self(product_id: Uuid, related_product_id: Uuid) -> CatalogResult<()> {
    if product_id == related_product_id {
        return Err(CatalogError::validation(
            "a product cannot be related to itself",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_self_relationship_is_rejected() {
        let product_id = Uuid::new_v4();
        let err = RelationshipMapper
            .to_entity(ProductRelationshipDto {
                product_id: Some(product_id),
                related_product_id: Some(product_id),
                relationship_type: Some(RelationshipType::Upgrade),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_relationship_type_is_required() {
        let err = RelationshipMapper
            .to_entity(ProductRelationshipDto {
                product_id: Some(Uuid::new_v4()),
                related_product_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("relationship_type"));
    }
}
