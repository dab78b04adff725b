//! Table metadata and row mapping for every catalog entity stored in PostgreSQL.

use anyhow::{Context, Result};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use crate::model::{
    Product, ProductBundle, ProductCategory, ProductConfiguration,
    ProductDocumentationRequirement, ProductFeature, ProductLocalization, ProductRelationship,
    ProductSubtype, ProductVersion, Record,
};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// How an entity maps onto its table.
///
/// `COLUMNS` starts with the id column and fixes the bind order used by
/// [`PgEntity::bind`].
pub trait PgEntity: Record {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Columns an upsert never rewrites once the row exists.
    const IMMUTABLE: &'static [&'static str];
    const PARENT_COLUMN: Option<&'static str> = None;
    const TENANT_COLUMN: Option<&'static str> = None;
    const UNIQUE_COLUMN: Option<&'static str> = None;

    fn from_row(row: &PgRow) -> Result<Self>;

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn parent_key(&self) -> Option<Uuid> {
        None
    }

    fn id_column() -> &'static str {
        Self::COLUMNS[0]
    }
}

fn text<T: std::str::FromStr>(row: &PgRow, column: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .with_context(|| format!("Invalid value in column {column}"))
}

impl PgEntity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "product_id",
        "tenant_id",
        "name",
        "description",
        "category_id",
        "status",
        "effective_date",
        "expiration_date",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["tenant_id", "created_at"];
    const TENANT_COLUMN: Option<&'static str> = Some("tenant_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Product {
            product_id: row.try_get("product_id")?,
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category_id: row.try_get("category_id")?,
            status: text(row, "status")?,
            effective_date: row.try_get("effective_date")?,
            expiration_date: row.try_get("expiration_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_id)
            .bind(self.tenant_id.as_str())
            .bind(self.name.as_str())
            .bind(self.description.as_deref())
            .bind(self.category_id)
            .bind(self.status.as_str())
            .bind(self.effective_date)
            .bind(self.expiration_date)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl PgEntity for ProductCategory {
    const TABLE: &'static str = "product_categories";
    const COLUMNS: &'static [&'static str] = &[
        "category_id",
        "tenant_id",
        "name",
        "description",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["tenant_id", "created_at"];
    const TENANT_COLUMN: Option<&'static str> = Some("tenant_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductCategory {
            category_id: row.try_get("category_id")?,
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.category_id)
            .bind(self.tenant_id.as_str())
            .bind(self.name.as_str())
            .bind(self.description.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl PgEntity for ProductBundle {
    const TABLE: &'static str = "product_bundles";
    const COLUMNS: &'static [&'static str] = &[
        "bundle_id",
        "tenant_id",
        "name",
        "description",
        "status",
        "product_ids",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["tenant_id", "created_at"];
    const TENANT_COLUMN: Option<&'static str> = Some("tenant_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductBundle {
            bundle_id: row.try_get("bundle_id")?,
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: text(row, "status")?,
            product_ids: row.try_get("product_ids")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.bundle_id)
            .bind(self.tenant_id.as_str())
            .bind(self.name.as_str())
            .bind(self.description.as_deref())
            .bind(self.status.as_str())
            .bind(self.product_ids.as_slice())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl PgEntity for ProductSubtype {
    const TABLE: &'static str = "product_subtypes";
    const COLUMNS: &'static [&'static str] = &[
        "subtype_id",
        "category_id",
        "name",
        "description",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["category_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("category_id");
    const UNIQUE_COLUMN: Option<&'static str> = Some("name");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductSubtype {
            subtype_id: row.try_get("subtype_id")?,
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.subtype_id)
            .bind(self.category_id)
            .bind(self.name.as_str())
            .bind(self.description.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.category_id)
    }
}

impl PgEntity for ProductFeature {
    const TABLE: &'static str = "product_features";
    const COLUMNS: &'static [&'static str] = &[
        "product_feature_id",
        "product_id",
        "name",
        "description",
        "feature_type",
        "is_active",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductFeature {
            product_feature_id: row.try_get("product_feature_id")?,
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            feature_type: text(row, "feature_type")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_feature_id)
            .bind(self.product_id)
            .bind(self.name.as_str())
            .bind(self.description.as_deref())
            .bind(self.feature_type.as_str())
            .bind(self.is_active)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

impl PgEntity for ProductVersion {
    const TABLE: &'static str = "product_versions";
    const COLUMNS: &'static [&'static str] = &[
        "product_version_id",
        "product_id",
        "version_label",
        "change_summary",
        "effective_date",
        "is_current",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductVersion {
            product_version_id: row.try_get("product_version_id")?,
            product_id: row.try_get("product_id")?,
            version_label: row.try_get("version_label")?,
            change_summary: row.try_get("change_summary")?,
            effective_date: row.try_get("effective_date")?,
            is_current: row.try_get("is_current")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_version_id)
            .bind(self.product_id)
            .bind(self.version_label.as_str())
            .bind(self.change_summary.as_deref())
            .bind(self.effective_date)
            .bind(self.is_current)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

impl PgEntity for ProductLocalization {
    const TABLE: &'static str = "product_localizations";
    const COLUMNS: &'static [&'static str] = &[
        "product_localization_id",
        "product_id",
        "locale",
        "localized_name",
        "localized_description",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductLocalization {
            product_localization_id: row.try_get("product_localization_id")?,
            product_id: row.try_get("product_id")?,
            locale: row.try_get("locale")?,
            localized_name: row.try_get("localized_name")?,
            localized_description: row.try_get("localized_description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_localization_id)
            .bind(self.product_id)
            .bind(self.locale.as_str())
            .bind(self.localized_name.as_str())
            .bind(self.localized_description.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

impl PgEntity for ProductRelationship {
    const TABLE: &'static str = "product_relationships";
    const COLUMNS: &'static [&'static str] = &[
        "product_relationship_id",
        "product_id",
        "related_product_id",
        "relationship_type",
        "description",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductRelationship {
            product_relationship_id: row.try_get("product_relationship_id")?,
            product_id: row.try_get("product_id")?,
            related_product_id: row.try_get("related_product_id")?,
            relationship_type: text(row, "relationship_type")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_relationship_id)
            .bind(self.product_id)
            .bind(self.related_product_id)
            .bind(self.relationship_type.as_str())
            .bind(self.description.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

impl PgEntity for ProductConfiguration {
    const TABLE: &'static str = "product_configurations";
    const COLUMNS: &'static [&'static str] = &[
        "product_configuration_id",
        "product_id",
        "config_key",
        "config_value",
        "value_type",
        "is_mandatory",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductConfiguration {
            product_configuration_id: row.try_get("product_configuration_id")?,
            product_id: row.try_get("product_id")?,
            config_key: row.try_get("config_key")?,
            config_value: row.try_get("config_value")?,
            value_type: text(row, "value_type")?,
            is_mandatory: row.try_get("is_mandatory")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_configuration_id)
            .bind(self.product_id)
            .bind(self.config_key.as_str())
            .bind(self.config_value.as_str())
            .bind(self.value_type.as_str())
            .bind(self.is_mandatory)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

impl PgEntity for ProductDocumentationRequirement {
    const TABLE: &'static str = "product_documentation_requirements";
    const COLUMNS: &'static [&'static str] = &[
        "product_documentation_requirement_id",
        "product_id",
        "document_type",
        "description",
        "is_mandatory",
        "created_at",
        "updated_at",
    ];
    const IMMUTABLE: &'static [&'static str] = &["product_id", "created_at"];
    const PARENT_COLUMN: Option<&'static str> = Some("product_id");

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(ProductDocumentationRequirement {
            product_documentation_requirement_id: row
                .try_get("product_documentation_requirement_id")?,
            product_id: row.try_get("product_id")?,
            document_type: row.try_get("document_type")?,
            description: row.try_get("description")?,
            is_mandatory: row.try_get("is_mandatory")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.product_documentation_requirement_id)
            .bind(self.product_id)
            .bind(self.document_type.as_str())
            .bind(self.description.as_deref())
            .bind(self.is_mandatory)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn parent_key(&self) -> Option<Uuid> {
        Some(self.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_columns<E: PgEntity>() {
        assert!(E::id_column().ends_with("_id"), "{}", E::TABLE);
        for column in E::IMMUTABLE {
            assert!(E::COLUMNS.contains(column), "{}.{column}", E::TABLE);
        }
        for column in E::SORTABLE {
            assert!(E::COLUMNS.contains(column), "{}.{column}", E::TABLE);
        }
        if let Some(parent) = E::PARENT_COLUMN {
            assert!(E::IMMUTABLE.contains(&parent), "{}.{parent}", E::TABLE);
        }
        if let Some(tenant) = E::TENANT_COLUMN {
            assert!(E::IMMUTABLE.contains(&tenant), "{}.{tenant}", E::TABLE);
        }
    }

    #[test]
    fn test_table_metadata_is_consistent() {
        check_columns::<Product>();
        check_columns::<ProductCategory>();
        check_columns::<ProductBundle>();
        check_columns::<ProductSubtype>();
        check_columns::<ProductFeature>();
        check_columns::<ProductVersion>();
        check_columns::<ProductLocalization>();
        check_columns::<ProductRelationship>();
        check_columns::<ProductConfiguration>();
        check_columns::<ProductDocumentationRequirement>();
    }
}
