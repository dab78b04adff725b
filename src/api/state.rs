use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::mapping::{ChildMapper, Mapper};
use crate::model::{
    BundleMapper, CategoryMapper, ChildRecord, ConfigurationMapper,
    DocumentationRequirementMapper, FeatureMapper, LocalizationMapper, Product, ProductBundle,
    ProductCategory, ProductConfiguration, ProductDocumentationRequirement, ProductFeature,
    ProductLocalization, ProductMapper, ProductRelationship, ProductSubtype, ProductVersion,
    RelationshipMapper, SubtypeMapper, TenantRecord, VersionMapper,
};
use crate::service::{CatalogService, ScopedCrudService};
use crate::store::CatalogStore;

/// Every service the HTTP layer can reach, built once from a single store.
pub struct AppState {
    pub products: CatalogService<ProductMapper>,
    pub categories: CatalogService<CategoryMapper>,
    pub bundles: CatalogService<BundleMapper>,
    pub subtypes: ScopedCrudService<SubtypeMapper>,
    pub features: ScopedCrudService<FeatureMapper>,
    pub versions: ScopedCrudService<VersionMapper>,
    pub localizations: ScopedCrudService<LocalizationMapper>,
    pub relationships: ScopedCrudService<RelationshipMapper>,
    pub configurations: ScopedCrudService<ConfigurationMapper>,
    pub documentation_requirements: ScopedCrudService<DocumentationRequirementMapper>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new<S: CatalogStore + 'static>(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            products: CatalogService::<ProductMapper>::new(store.clone(), ProductMapper),
            categories: CatalogService::<CategoryMapper>::new(store.clone(), CategoryMapper),
            bundles: CatalogService::<BundleMapper>::new(store.clone(), BundleMapper),
            subtypes: ScopedCrudService::<SubtypeMapper>::new(store.clone(), SubtypeMapper),
            features: ScopedCrudService::<FeatureMapper>::new(store.clone(), FeatureMapper),
            versions: ScopedCrudService::<VersionMapper>::new(store.clone(), VersionMapper),
            localizations: ScopedCrudService::<LocalizationMapper>::new(
                store.clone(),
                LocalizationMapper,
            ),
            relationships: ScopedCrudService::<RelationshipMapper>::new(
                store.clone(),
                RelationshipMapper,
            ),
            configurations: ScopedCrudService::<ConfigurationMapper>::new(
                store.clone(),
                ConfigurationMapper,
            ),
            documentation_requirements: ScopedCrudService::<DocumentationRequirementMapper>::new(
                store,
                DocumentationRequirementMapper,
            ),
            pagination,
        }
    }
}

/// Selects a top-level service for the generic handlers.
pub trait TopLevelResource: Send + Sync + 'static {
    type Entity: TenantRecord;
    type Mapper: Mapper<Entity = Self::Entity>;

    fn service(state: &AppState) -> &CatalogService<Self::Mapper>;
}

/// Selects a parent-scoped service for the generic handlers.
pub trait ScopedResource: Send + Sync + 'static {
    type Entity: ChildRecord;
    type Mapper: ChildMapper<Entity = Self::Entity>;

    fn service(state: &AppState) -> &ScopedCrudService<Self::Mapper>;
}

macro_rules! top_level_resource {
    ($marker:ident, $entity:ty, $mapper:ty, $field:ident) => {
        pub struct $marker;

        impl TopLevelResource for $marker {
            type Entity = $entity;
            type Mapper = $mapper;

            fn service(state: &AppState) -> &CatalogService<$mapper> {
                &state.$field
            }
        }
    };
}

macro_rules! scoped_resource {
    ($marker:ident, $entity:ty, $mapper:ty, $field:ident) => {
        pub struct $marker;

        impl ScopedResource for $marker {
            type Entity = $entity;
            type Mapper = $mapper;

            fn service(state: &AppState) -> &ScopedCrudService<$mapper> {
                &state.$field
            }
        }
    };
}

top_level_resource!(Products, Product, ProductMapper, products);
top_level_resource!(Categories, ProductCategory, CategoryMapper, categories);
top_level_resource!(Bundles, ProductBundle, BundleMapper, bundles);

scoped_resource!(Subtypes, ProductSubtype, SubtypeMapper, subtypes);
scoped_resource!(Features, ProductFeature, FeatureMapper, features);
scoped_resource!(Versions, ProductVersion, VersionMapper, versions);
scoped_resource!(Localizations, ProductLocalization, LocalizationMapper, localizations);
scoped_resource!(Relationships, ProductRelationship, RelationshipMapper, relationships);
scoped_resource!(Configurations, ProductConfiguration, ConfigurationMapper, configurations);
scoped_resource!(
    DocumentationRequirements,
    ProductDocumentationRequirement,
    DocumentationRequirementMapper,
    documentation_requirements
);
