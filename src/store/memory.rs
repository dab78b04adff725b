//! In-process store used for local runs without PostgreSQL and for tests.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{
    ChildRecord, Product, ProductBundle, ProductCategory, ProductConfiguration,
    ProductDocumentationRequirement, ProductFeature, ProductLocalization, ProductRelationship,
    ProductSubtype, ProductVersion, Record, TenantRecord,
};
use crate::pagination::{PageSpec, Sort, SortDirection};
use crate::store::traits::{ChildStore, EntityStore, StoreConflict, TenantStore};

#[derive(Debug)]
pub struct Table<E> {
    rows: RwLock<HashMap<Uuid, E>>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Record> Table<E> {
    fn select(&self, filter: impl Fn(&E) -> bool) -> Vec<E> {
        self.rows.read().values().filter(|row| filter(row)).cloned().collect()
    }

    fn count(&self, filter: impl Fn(&E) -> bool) -> u64 {
        self.rows.read().values().filter(|row| filter(row)).count() as u64
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    products: Table<Product>,
    categories: Table<ProductCategory>,
    bundles: Table<ProductBundle>,
    subtypes: Table<ProductSubtype>,
    features: Table<ProductFeature>,
    versions: Table<ProductVersion>,
    localizations: Table<ProductLocalization>,
    relationships: Table<ProductRelationship>,
    configurations: Table<ProductConfiguration>,
    documentation_requirements: Table<ProductDocumentationRequirement>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Routes an entity type to its table inside [`MemoryStore`].
pub trait MemoryTable<E> {
    fn table(&self) -> &Table<E>;
}

impl MemoryTable<Product> for MemoryStore {
    fn table(&self) -> &Table<Product> {
        &self.products
    }
}

impl MemoryTable<ProductCategory> for MemoryStore {
    fn table(&self) -> &Table<ProductCategory> {
        &self.categories
    }
}

impl MemoryTable<ProductBundle> for MemoryStore {
    fn table(&self) -> &Table<ProductBundle> {
        &self.bundles
    }
}

impl MemoryTable<ProductSubtype> for MemoryStore {
    fn table(&self) -> &Table<ProductSubtype> {
        &self.subtypes
    }
}

impl MemoryTable<ProductFeature> for MemoryStore {
    fn table(&self) -> &Table<ProductFeature> {
        &self.features
    }
}

impl MemoryTable<ProductVersion> for MemoryStore {
    fn table(&self) -> &Table<ProductVersion> {
        &self.versions
    }
}

impl MemoryTable<ProductLocalization> for MemoryStore {
    fn table(&self) -> &Table<ProductLocalization> {
        &self.localizations
    }
}

impl MemoryTable<ProductRelationship> for MemoryStore {
    fn table(&self) -> &Table<ProductRelationship> {
        &self.relationships
    }
}

impl MemoryTable<ProductConfiguration> for MemoryStore {
    fn table(&self) -> &Table<ProductConfiguration> {
        &self.configurations
    }
}

impl MemoryTable<ProductDocumentationRequirement> for MemoryStore {
    fn table(&self) -> &Table<ProductDocumentationRequirement> {
        &self.documentation_requirements
    }
}

#[async_trait::async_trait]
impl<E> EntityStore<E> for MemoryStore
where
    E: Record,
    MemoryStore: MemoryTable<E>,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        Ok(MemoryTable::<E>::table(self).rows.read().get(&id).cloned())
    }

    async fn save(&self, entity: E) -> Result<E> {
        let mut rows = MemoryTable::<E>::table(self).rows.write();
        check_unique(&rows, &entity)?;
        rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<Option<E>> {
        let mut rows = MemoryTable::<E>::table(self).rows.write();
        if !rows.contains_key(&entity.id()) {
            return Ok(None);
        }
        check_unique(&rows, &entity)?;
        rows.insert(entity.id(), entity.clone());
        Ok(Some(entity))
    }

    async fn delete(&self, entity: &E) -> Result<bool> {
        Ok(MemoryTable::<E>::table(self).rows.write().remove(&entity.id()).is_some())
    }

    async fn exists_by_unique_key(&self, key: &str) -> Result<bool> {
        Ok(MemoryTable::<E>::table(self).count(|row| row.unique_key() == Some(key)) > 0)
    }
}

#[async_trait::async_trait]
impl<E> ChildStore<E> for MemoryStore
where
    E: ChildRecord,
    MemoryStore: MemoryTable<E>,
{
    async fn find_by_parent_id(&self, parent_id: Uuid, page: &PageSpec) -> Result<Vec<E>> {
        let rows = MemoryTable::<E>::table(self).select(|row| row.parent_id() == parent_id);
        Ok(window(rows, page))
    }

    async fn count_by_parent_id(&self, parent_id: Uuid) -> Result<u64> {
        Ok(MemoryTable::<E>::table(self).count(|row: &E| row.parent_id() == parent_id))
    }
}

#[async_trait::async_trait]
impl<E> TenantStore<E> for MemoryStore
where
    E: TenantRecord,
    MemoryStore: MemoryTable<E>,
{
    async fn find_page(&self, tenant_id: Option<&str>, page: &PageSpec) -> Result<Vec<E>> {
        let rows = MemoryTable::<E>::table(self)
            .select(|row: &E| tenant_id.map_or(true, |tenant| row.tenant_id() == tenant));
        Ok(window(rows, page))
    }

    async fn count(&self, tenant_id: Option<&str>) -> Result<u64> {
        Ok(MemoryTable::<E>::table(self)
            .count(|row: &E| tenant_id.map_or(true, |tenant| row.tenant_id() == tenant)))
    }
}

fn check_unique<E: Record>(rows: &HashMap<Uuid, E>, entity: &E) -> Result<()> {
    if let Some(key) = entity.unique_key() {
        let taken = rows
            .values()
            .any(|row| row.id() != entity.id() && row.unique_key() == Some(key));
        if taken {
            return Err(StoreConflict::Unique(format!("{} unique key", E::ENTITY)).into());
        }
    }
    Ok(())
}

/// Order rows the way the SQL store does, then cut out the requested window.
fn window<E: Record>(rows: Vec<E>, page: &PageSpec) -> Vec<E> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    let tie_break = |a: &E, b: &E| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id()));

    match &page.sort {
        None => rows
            .into_iter()
            .sorted_by(tie_break)
            .skip(offset)
            .take(limit)
            .collect(),
        Some(sort) => rows
            .into_iter()
            .map(|row| (sort_value(&row, sort), row))
            .sorted_by(|(a_key, a), (b_key, b)| {
                let ordering = compare_values(a_key, b_key);
                let ordering = match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                ordering.then_with(|| tie_break(a, b))
            })
            .map(|(_, row)| row)
            .skip(offset)
            .take(limit)
            .collect(),
    }
}

fn sort_value<E: Record>(row: &E, sort: &Sort) -> Value {
    serde_json::to_value(row)
        .ok()
        .and_then(|mut value| value.get_mut(&sort.field).map(Value::take))
        .unwrap_or(Value::Null)
}

/// Nulls sort last, like PostgreSQL's default for ascending order.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => match (timestamp(a), timestamp(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.cmp(b),
        },
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// Timestamps serialize with a variable number of fractional digits, so
/// their text does not sort chronologically.
fn timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}
