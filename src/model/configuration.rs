use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::mapping::{merge_text, merge_value, required, required_text, ChildMapper, Mapper};
use crate::model::{now, ChildRecord, Record, UnknownVariant};

/// How a configuration value is interpreted by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValueType {
    #[default]
    String,
    Number,
    Boolean,
    Json,
}

impl ConfigValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigValueType::String => "string",
            ConfigValueType::Number => "number",
            ConfigValueType::Boolean => "boolean",
            ConfigValueType::Json => "json",
        }
    }

    /// Check that `value` can be read as this type.
    pub fn check(&self, value: &str) -> CatalogResult<()> {
        let valid = match self {
            ConfigValueType::String => true,
            ConfigValueType::Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
            ConfigValueType::Boolean => matches!(value.trim(), "true" | "false"),
            ConfigValueType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
        };
        if valid {
            Ok(())
        } else {
            Err(CatalogError::validation(format!(
                "config_value '{value}' is not a valid {}",
                self.as_str()
            )))
        }
    }
}

impl std::str::FromStr for ConfigValueType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ConfigValueType::String),
            "number" => Ok(ConfigValueType::Number),
            "boolean" => Ok(ConfigValueType::Boolean),
            "json" => Ok(ConfigValueType::Json),
            other => Err(UnknownVariant {
                kind: "config value type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    pub product_configuration_id: Uuid,
    pub product_id: Uuid,
    pub config_key: String,
    pub config_value: String,
    pub value_type: ConfigValueType,
    pub is_mandatory: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ProductConfiguration {
    const ENTITY: &'static str = "product configuration";
    const SORTABLE: &'static [&'static str] =
        &["config_key", "value_type", "is_mandatory", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.product_configuration_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ChildRecord for ProductConfiguration {
    fn parent_id(&self) -> Uuid {
        self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfigurationDto {
    pub product_configuration_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub config_key: Option<String>,
    pub config_value: Option<String>,
    pub value_type: Option<ConfigValueType>,
    pub is_mandatory: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationMapper;

impl Mapper for ConfigurationMapper {
    type Entity = ProductConfiguration;
    type Dto = ProductConfigurationDto;

    fn to_dto(&self, configuration: ProductConfiguration) -> ProductConfigurationDto {
        ProductConfigurationDto {
            product_configuration_id: Some(configuration.product_configuration_id),
            product_id: Some(configuration.product_id),
            config_key: Some(configuration.config_key),
            config_value: Some(configuration.config_value),
            value_type: Some(configuration.value_type),
            is_mandatory: Some(configuration.is_mandatory),
            created_at: Some(configuration.created_at),
            updated_at: Some(configuration.updated_at),
        }
    }

    fn to_entity(&self, dto: ProductConfigurationDto) -> CatalogResult<ProductConfiguration> {
        let value_type = dto.value_type.unwrap_or_default();
        let config_value = required(dto.config_value, "config_value")?;
        value_type.check(&config_value)?;
        let created_at = now();
        Ok(ProductConfiguration {
            product_configuration_id: Uuid::new_v4(),
            product_id: required(dto.product_id, "product_id")?,
            config_key: required_text(dto.config_key, "config_key")?,
            config_value,
            value_type,
            is_mandatory: dto.is_mandatory.unwrap_or(false),
            created_at,
            updated_at: created_at,
        })
    }

    fn merge(
        &self,
        dto: ProductConfigurationDto,
        configuration: &mut ProductConfiguration,
    ) -> CatalogResult<()> {
        // Value and type are checked together so a type change cannot strand
        // an incompatible stored value.
        let value_type = dto.value_type.unwrap_or(configuration.value_type);
        let config_value = dto
            .config_value
            .unwrap_or_else(|| configuration.config_value.clone());
        value_type.check(&config_value)?;

        merge_text(&mut configuration.config_key, dto.config_key, "config_key")?;
        configuration.value_type = value_type;
        configuration.config_value = config_value;
        merge_value(&mut configuration.is_mandatory, dto.is_mandatory);
        configuration.updated_at = now();
        Ok(())
    }
}

impl ChildMapper for ConfigurationMapper {
    fn assign_parent(&self, dto: &mut ProductConfigurationDto, product_id: Uuid) {
        dto.product_id = Some(product_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_value_checked_against_type() {
        assert!(ConfigValueType::Number.check("12.5").is_ok());
        assert!(ConfigValueType::Number.check("NaN").is_err());
        assert!(ConfigValueType::Boolean.check("yes").is_err());
        assert!(ConfigValueType::Json.check(r#"{"tiers": [1, 2]}"#).is_ok());
        assert!(ConfigValueType::String.check("anything").is_ok());
    }

    #[test]
    fn test_type_change_must_fit_stored_value() {
        let mut configuration = ConfigurationMapper
            .to_entity(ProductConfigurationDto {
                product_id: Some(Uuid::new_v4()),
                config_key: Some("monthly_fee".to_string()),
                config_value: Some("monthly".to_string()),
                ..Default::default()
            })
            .unwrap();

        let err = ConfigurationMapper
            .merge(
                ProductConfigurationDto {
                    value_type: Some(ConfigValueType::Number),
                    ..Default::default()
                },
                &mut configuration,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(configuration.value_type, ConfigValueType::String);

        ConfigurationMapper
            .merge(
                ProductConfigurationDto {
                    value_type: Some(ConfigValueType::Number),
                    config_value: Some("4.99".to_string()),
                    ..Default::default()
                },
                &mut configuration,
            )
            .unwrap();
        assert_eq!(configuration.config_value, "4.99");
    }
}
