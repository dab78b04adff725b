use anyhow::{Context, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::api::AppState;
use crate::model::{
    ConfigValueType, FeatureType, ProductBundleDto, ProductCategoryDto, ProductConfigurationDto,
    ProductDocumentationRequirementDto, ProductDto, ProductFeatureDto, ProductLocalizationDto,
    ProductRelationshipDto, ProductStatus, ProductSubtypeDto, ProductVersionDto,
    RelationshipType,
};
use crate::pagination::PageRequest;

pub const DEMO_TENANT: &str = "demo-bank";

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// Load a small retail-banking catalog for the demo tenant.
///
/// Goes through the services so every record passes the same validation as
/// an API call. Does nothing when the demo tenant already has products.
pub async fn load_seed_data(state: &AppState) -> Result<()> {
    let existing = state
        .products
        .list(Some(DEMO_TENANT), &PageRequest::first(1)?)
        .await?;
    if existing.total_elements > 0 {
        log::info!("Seed data already present for tenant {DEMO_TENANT}, skipping");
        return Ok(());
    }

    let category_id = create_category(state).await?;
    let checking = create_product(state, category_id, "Everyday Checking", ProductStatus::Active).await?;
    let premium = create_product(state, category_id, "Premium Checking", ProductStatus::Draft).await?;

    load_checking_details(state, checking).await?;

    state
        .relationships
        .create(
            checking,
            ProductRelationshipDto {
                related_product_id: Some(premium),
                relationship_type: Some(RelationshipType::Upgrade),
                description: text("Move to premium once the balance stays above 10k"),
                ..Default::default()
            },
        )
        .await?;

    state
        .bundles
        .create(ProductBundleDto {
            tenant_id: text(DEMO_TENANT),
            name: text("Checking Starter Pack"),
            description: text("Both checking accounts at a bundled monthly fee"),
            status: Some(ProductStatus::Active),
            product_ids: Some(vec![checking, premium]),
            ..Default::default()
        })
        .await?;

    log::info!("Seed data loaded for tenant {DEMO_TENANT}");
    Ok(())
}

async fn create_category(state: &AppState) -> Result<Uuid> {
    let category = state
        .categories
        .create(ProductCategoryDto {
            tenant_id: text(DEMO_TENANT),
            name: text("Deposit Accounts"),
            description: text("Accounts that hold customer funds"),
            ..Default::default()
        })
        .await?;
    let category_id = category
        .category_id
        .context("Created category has no id")?;

    for (name, description) in [
        ("Personal Checking", "Checking accounts for individuals"),
        ("Business Checking", "Checking accounts for registered businesses"),
    ] {
        state
            .subtypes
            .create(
                category_id,
                ProductSubtypeDto {
                    name: text(name),
                    description: text(description),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(category_id)
}

async fn create_product(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    status: ProductStatus,
) -> Result<Uuid> {
    let product = state
        .products
        .create(ProductDto {
            tenant_id: text(DEMO_TENANT),
            name: text(name),
            category_id: Some(category_id),
            status: Some(status),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        })
        .await?;
    product.product_id.context("Created product has no id")
}

async fn load_checking_details(state: &AppState, product_id: Uuid) -> Result<()> {
    for (name, feature_type) in [
        ("Debit card", FeatureType::Standard),
        ("Overdraft protection", FeatureType::Optional),
        ("Airport lounge access", FeatureType::Premium),
    ] {
        state
            .features
            .create(
                product_id,
                ProductFeatureDto {
                    name: text(name),
                    feature_type: Some(feature_type),
                    ..Default::default()
                },
            )
            .await?;
    }

    state
        .versions
        .create(
            product_id,
            ProductVersionDto {
                version_label: text("2024.1"),
                change_summary: text("Initial launch"),
                effective_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                is_current: Some(true),
                ..Default::default()
            },
        )
        .await?;

    for (locale, name) in [("en-US", "Everyday Checking"), ("sv-SE", "Vardagskonto")] {
        state
            .localizations
            .create(
                product_id,
                ProductLocalizationDto {
                    locale: text(locale),
                    localized_name: text(name),
                    ..Default::default()
                },
            )
            .await?;
    }

    for (key, value, value_type) in [
        ("monthly_fee", "4.99", ConfigValueType::Number),
        ("paperless_statements", "true", ConfigValueType::Boolean),
    ] {
        state
            .configurations
            .create(
                product_id,
                ProductConfigurationDto {
                    config_key: text(key),
                    config_value: text(value),
                    value_type: Some(value_type),
                    is_mandatory: Some(true),
                    ..Default::default()
                },
            )
            .await?;
    }

    for document_type in ["Government issued ID", "Proof of address"] {
        state
            .documentation_requirements
            .create(
                product_id,
                ProductDocumentationRequirementDto {
                    document_type: text(document_type),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(())
}
