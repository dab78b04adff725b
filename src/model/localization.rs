use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::mapping::{
    merge_optional, merge_text, required, required_text, ChildMapper, Mapper,
};
use crate::model::{now, ChildRecord, Record};

/// Display text for a product in one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLocalization {
    pub product_localization_id: Uuid,
    pub product_id: Uuid,
    pub locale: String,
    pub localized_name: String,
    pub localized_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductLocalization {
    const ENTITY: &'static str = "product localization";
    const SORTABLE: &'static [&'static str] =
        &["locale", "localized_name", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_localization_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductLocalization {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductLocalizationDto {
    pub product_localization_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub locale: Option<String>,
    pub localized_name: Option<String>,
    pub localized_description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalizationMapper;

impl Mapper for LocalizationMapper {
    type Entity = ProductLocalization;
    type Dto = ProductLocalizationDto;

    fn to_dto(&self, localization: ProductLocalization) -> ProductLocalizationDto {
        ProductLocalizationDto {
            product_localization_id: Some(localization.product_localization_id),
            product_id: Some(localization.product_id),
            locale: Some(localization.locale),
            localized_name: Some(localization.localized_name),
            localized_description: localization.localized_description,
            created_at: Some(localization.created_at),
            updated_at: Some(localization.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductLocalizationDto) -> CatalogResult<ProductLocalization> {
        let locale = required_text(dto.locale, "locale")?;
        check_locale(&locale)?;
        let created_at = now();
        Ok(ProductLocalization {
            product_localization_id: Uuid::new_v4(),
            product_id: required(dto.product_id, "product_id")?,
            locale,
            localized_name: required_text(dto.localized_name, "localized_name")?,
            localized_description: dto.localized_description,
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(&self, dto: ProductLocalizationDto, localization: &mut ProductLocalization) -> CatalogResult<()> {
        if let Some(locale) = dto.locale {
            check_locale(&locale)?;
            localization.locale = locale;
        }
        merge_text(&mut localization.localized_name, dto.localized_name, "localized_name")?;
        merge_optional(
            &mut localization.localized_description,
            dto.localized_description,
        );
        localization.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for LocalizationMapper {
    fn assign_parent(&self, dto: &mut ProductLocalizationDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}

/// Accepts BCP 47 style tags such as `en`, `en-US` or `pt-BR`.
fn check_locale(locale: &str) -> CatalogResult<()> {
    let mut parts = locale.split(['-', '_']);
    let language_ok = parts
        .next()
        .is_some_and(|l| (2..=3).contains(&l.len()) && l.chars().all(|c| c.is_ascii_alphabetic()));
    let rest_ok = parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));
    if language_ok && rest_ok {
        Ok(())
    } else {
        Err(CatalogError::validation(format!("'{locale}' is not a valid locale")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_validation() {
        assert!(check_locale("en").is_ok());
        assert!(check_locale("en-US").is_ok());
        assert!(check_locale("zh_Hant_TW").is_ok());
        assert!(check_locale("english").is_err());
        assert!(check_locale("en-").is_err());
    }

    #[test]
    fn test_merge_rejects_invalid_locale() {
        let mut localization = LocalizationMapper
            .to_entity(ProductLocalizationDto {
                product_id: Some(Uuid::new_v4()),
                locale: Some("de-DE".to_string()),
                localized_name: Some("Girokonto".to_string()),
                ..Default::default()
            })
            .unwrap();

        let err = LocalizationMapper
            .merge(
                ProductLocalizationDto {
                    locale: Some("??".to_string()),
                    ..Default::default()
                },
                &mut localization,
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert_eq!(localization.locale, "de-DE");

        LocalizationMapper
            .merge(
                ProductLocalizationDto {
                    localized_name: Some("Girokonto Plus".to_string()),
                    ..Default::default()
                },
                &mut localization,
            )
            .unwrap();
        assert_eq!(localization.localized_name, "Girokonto Plus");
    }
}
