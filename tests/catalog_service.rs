use std::collections::HashSet;
use std::sync::Arc;

use catalog_service::config::PaginationConfig;
use catalog_service::model::{
    ProductCategoryDto, ProductDto, ProductFeatureDto, ProductLocalizationDto, ProductSubtypeDto,
};
use catalog_service::{AppState, ErrorKind, MemoryStore, PageRequest};
use uuid::Uuid;

fn state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), PaginationConfig::default())
}

async fn create_product(state: &AppState, tenant_id: &str, name: &str) -> Uuid {
    state
        .products
        .create(ProductDto {
            tenant_id: Some(tenant_id.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .product_id
        .unwrap()
}

async fn create_feature(state: &AppState, product_id: Uuid, name: &str) -> ProductFeatureDto {
    state
        .features
        .create(
            product_id,
            ProductFeatureDto {
                name: Some(name.to_string()),
                description: Some("original".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_child_is_invisible_to_other_parents() {
    let state = state();
    let owner = create_product(&state, "t1", "Checking").await;
    let other = create_product(&state, "t1", "Savings").await;
    let feature = create_feature(&state, owner, "Debit card").await;
    let feature_id = feature.product_feature_id.unwrap();

    for parent in [other, Uuid::new_v4()] {
        let err = state.features.get(parent, feature_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = state
            .features
            .update(parent, feature_id, ProductFeatureDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = state.features.delete(parent, feature_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    assert!(state.features.get(owner, feature_id).await.is_ok());
}

#[tokio::test]
async fn test_update_never_touches_identity_parent_or_creation() {
    let state = state();
    let product_id = create_product(&state, "t1", "Checking").await;
    let original = create_feature(&state, product_id, "Debit card").await;
    let feature_id = original.product_feature_id.unwrap();

    let updated = state
        .features
        .update(
            product_id,
            feature_id,
            ProductFeatureDto {
                product_feature_id: Some(Uuid::new_v4()),
                product_id: Some(Uuid::new_v4()),
                created_at: Some(chrono::Utc::now() + chrono::Duration::days(30)),
                name: Some("Contactless debit card".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.product_feature_id, Some(feature_id));
    assert_eq!(updated.product_id, Some(product_id));
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.name.as_deref(), Some("Contactless debit card"));

    let stored = state.features.get(product_id, feature_id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_pages_partition_all_children() {
    let state = state();
    let product_id = create_product(&state, "t1", "Checking").await;
    let total = 23;
    for n in 0..total {
        create_feature(&state, product_id, &format!("Feature {n}")).await;
    }

    let size = 5;
    let mut seen = HashSet::new();
    let mut page_index = 0;
    loop {
        let request = PageRequest::new(page_index, size, 100).unwrap();
        let page = state.features.list(product_id, &request).await.unwrap();
        assert_eq!(page.total_elements, total);
        assert_eq!(page.total_pages, 5);
        for feature in &page.content {
            assert!(seen.insert(feature.product_feature_id.unwrap()));
        }
        if page.last {
            break;
        }
        page_index += 1;
    }

    assert_eq!(page_index, 4);
    assert_eq!(seen.len() as u64, total);
}

#[tokio::test]
async fn test_parent_without_children_lists_empty_page() {
    let state = state();
    let product_id = create_product(&state, "t1", "Checking").await;

    for page_index in [0, 3] {
        let request = PageRequest::new(page_index, 10, 100).unwrap();
        let page = state.features.list(product_id, &request).await.unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 0);
        assert_eq!(page.total_pages, 0);
    }
}

#[tokio::test]
async fn test_duplicate_subtype_name_conflicts() {
    let state = state();
    let category_id = state
        .categories
        .create(ProductCategoryDto {
            tenant_id: Some("t1".to_string()),
            name: Some("Deposits".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .category_id
        .unwrap();
    let subtype = |name: &str| ProductSubtypeDto {
        name: Some(name.to_string()),
        ..Default::default()
    };

    state.subtypes.create(category_id, subtype("Student")).await.unwrap();
    let err = state
        .subtypes
        .create(category_id, subtype("Student"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    state.subtypes.create(category_id, subtype("Senior")).await.unwrap();
}

#[tokio::test]
async fn test_product_round_trip_keeps_tenant() {
    let state = state();
    let product_id = create_product(&state, "T1", "Checking").await;

    let product = state.products.get(product_id).await.unwrap();
    assert_eq!(product.name.as_deref(), Some("Checking"));
    assert_eq!(product.tenant_id.as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_feature_lookup_requires_its_product() {
    let state = state();
    let product_id = create_product(&state, "T1", "Checking").await;
    let feature = create_feature(&state, product_id, "Debit card").await;
    let feature_id = feature.product_feature_id.unwrap();

    let err = state.features.get(Uuid::new_v4(), feature_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let found = state.features.get(product_id, feature_id).await.unwrap();
    assert_eq!(found.name.as_deref(), Some("Debit card"));
}

#[tokio::test]
async fn test_localizations_paginate_in_tens() {
    let state = state();
    let product_id = create_product(&state, "T1", "Checking").await;
    for n in 0..25 {
        state
            .localizations
            .create(
                product_id,
                ProductLocalizationDto {
                    locale: Some("en-US".to_string()),
                    localized_name: Some(format!("Checking {n}")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let first = state
        .localizations
        .list(product_id, &PageRequest::new(0, 10, 100).unwrap())
        .await
        .unwrap();
    assert_eq!(first.content.len(), 10);
    assert_eq!(first.total_elements, 25);
    assert_eq!(first.total_pages, 3);
    assert!(first.first);
    assert!(!first.last);

    let third = state
        .localizations
        .list(product_id, &PageRequest::new(2, 10, 100).unwrap())
        .await
        .unwrap();
    assert_eq!(third.content.len(), 5);
    assert!(third.last);
}

#[tokio::test]
async fn test_description_only_update_keeps_ids() {
    let state = state();
    let product_id = create_product(&state, "T1", "Checking").await;
    let feature = create_feature(&state, product_id, "Debit card").await;
    let feature_id = feature.product_feature_id.unwrap();

    let updated = state
        .features
        .update(
            product_id,
            feature_id,
            ProductFeatureDto {
                description: Some("Visa debit".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.product_feature_id, Some(feature_id));
    assert_eq!(updated.product_id, Some(product_id));
    assert_eq!(updated.description.as_deref(), Some("Visa debit"));
    assert_eq!(updated.name.as_deref(), Some("Debit card"));
}

#[tokio::test]
async fn test_renaming_subtype_to_taken_name_conflicts() {
    let state = state();
    let category_id = state
        .categories
        .create(ProductCategoryDto {
            tenant_id: Some("t1".to_string()),
            name: Some("Deposits".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .category_id
        .unwrap();
    let subtype = |name: &str| ProductSubtypeDto {
        name: Some(name.to_string()),
        ..Default::default()
    };

    state.subtypes.create(category_id, subtype("Student")).await.unwrap();
    let senior = state
        .subtypes
        .create(category_id, subtype("Senior"))
        .await
        .unwrap()
        .subtype_id
        .unwrap();

    let err = state
        .subtypes
        .update(category_id, senior, subtype("Student"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let unchanged = state.subtypes.get(category_id, senior).await.unwrap();
    assert_eq!(unchanged.name.as_deref(), Some("Senior"));

    let renamed = state
        .subtypes
        .update(category_id, senior, subtype("Retiree"))
        .await
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Retiree"));
}
