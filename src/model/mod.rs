pub mod bundle;
pub mod category;
pub mod configuration;
pub mod documentation;
pub mod feature;
pub mod localization;
pub mod product;
pub mod relationship;
pub mod version;

pub use bundle::*;
pub use category::*;
pub use configuration::*;
pub use documentation::*;
pub use feature::*;
pub use localization::*;
pub use product::*;
pub use relationship::*;
pub use version::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted catalog row.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Human readable entity name used in errors and logs.
    const ENTITY: &'static str;
    /// Fields a page request may sort by.
    const SORTABLE: &'static [&'static str];

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;

    /// Value covered by a uniqueness constraint across the whole table.
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// A record owned by exactly one parent record.
pub trait ChildRecord: Record {
    fn parent_id(&self) -> Uuid;
}

/// A top-level record that belongs to a tenant.
pub trait TenantRecord: Record {
    fn tenant_id(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle status shared by products and bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Inactive,
    Retired,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Retired => "retired",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "retired" => Ok(ProductStatus::Retired),
            other => Err(UnknownVariant {
                kind: "product status",
                value: other.to_string(),
            }),
        }
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_round_trip() {
        for status in [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Inactive,
            ProductStatus::Retired,
        ] {
            assert_eq!(status.as_str().parse::<ProductStatus>().unwrap(), status);
        }
        let err = "archived".parse::<ProductStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown product status 'archived'");
    }
}
