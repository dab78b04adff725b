use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::mapping::{
    merge_optional, merge_text, merge_value, required, required_text, ChildMapper, Mapper,
};
use crate::model::{now, ChildRecord, Record};

/// A document an applicant must provide to open the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocumentationRequirement {
    pub product_documentation_requirement_id: Uuid,
    pub product_id: Uuid,
    pub document_type: String,
    pub description: Option<String>,
    pub is_mandatory: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductDocumentationRequirement {
    const ENTITY: &'static str = "product documentation requirement";
    const SORTABLE: &'static [&'static str] =
        &["document_type", "is_mandatory", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_documentation_requirement_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductDocumentationRequirement {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDocumentationRequirementDto {
    pub product_documentation_requirement_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub description: Option<String>,
    pub is_mandatory: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentationRequirementMapper;

impl Mapper for DocumentationRequirementMapper {
    type Entity = ProductDocumentationRequirement;
    type Dto = ProductDocumentationRequirementDto;

    fn to_dto(&self, requirement: ProductDocumentationRequirement) -> ProductDocumentationRequirementDto {
        ProductDocumentationRequirementDto {
            product_documentation_requirement_id: Some(requirement.product_documentation_requirement_id),
            product_id: Some(requirement.product_id),
            document_type: Some(requirement.document_type),
            description: requirement.description,
            is_mandatory: Some(requirement.is_mandatory),
            created_at: Some(requirement.created_at),
            updated_at: Some(requirement.updated_at),
        }
    }

    fn to_entity(
        &self,
        dto: ProductDocumentationRequirementDto,
    ) -> CatalogResult<ProductDocumentationRequirement> {
        let created_at = now();
        Ok(ProductDocumentationRequirement {
            product_documentation_requirement_id: Uuid::new_v4(),
            product_id: required(dto.product_id, "product_id")?,
            document_type: required_text(dto.document_type, "document_type")?,
            description: dto.description,
            is_mandatory: dto.is_mandatory.unwrap_or(true),
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(
        &self,
        dto: ProductDocumentationRequirementDto,
        requirement: &mut ProductDocumentationRequirement,
    ) -> CatalogResult<()> {
        merge_text(&mut requirement.document_type, dto.document_type, "document_type")?;
        merge_optional(&mut requirement.description, dto.description);
        merge_value(&mut requirement.is_mandatory, dto.is_mandatory);
        requirement.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for DocumentationRequirementMapper {
    fn assign_parent(&self, dto: &mut ProductDocumentationRequirementDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}
