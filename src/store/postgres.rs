use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use crate::model::{ChildRecord, TenantRecord};
use crate::pagination::PageSpec;
use crate::store::pg_tables::PgEntity;
use crate::store::traits::{ChildStore, EntityStore, StoreConflict, TenantStore};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Apply the versioned SQL files under `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turn constraint violations into [`StoreConflict`] so callers can tell them
/// apart from infrastructure failures.
fn classify(err: sqlx::Error, context: String) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("unnamed").to_string();
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreConflict::Unique(constraint).into(),
            Some(FOREIGN_KEY_VIOLATION) => return StoreConflict::Referenced(constraint).into(),
            _ => {}
        }
    }
    anyhow::Error::new(err).context(context)
}

fn select_list<E: PgEntity>() -> String {
    E::COLUMNS.join(", ")
}

/// `INSERT ... ON CONFLICT (id) DO UPDATE` that leaves immutable columns alone.
fn upsert_sql<E: PgEntity>() -> String {
    let placeholders = (1..=E::COLUMNS.len()).map(|n| format!("${n}")).join(", ");
    let assignments = E::COLUMNS
        .iter()
        .skip(1)
        .filter(|column| !E::IMMUTABLE.contains(*column))
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT ({id}) DO UPDATE SET {assignments} \
         RETURNING {columns}",
        table = E::TABLE,
        columns = select_list::<E>(),
        id = E::id_column(),
    )
}

/// `UPDATE ... RETURNING` binding the same parameters as [`upsert_sql`].
/// Immutable columns are left alone and the parent column guards the row.
fn update_sql<E: PgEntity>() -> String {
    let placeholder = |column: &str| {
        E::COLUMNS
            .iter()
            .position(|candidate| *candidate == column)
            .map(|index| format!("${}", index + 1))
    };
    let assignments = E::COLUMNS
        .iter()
        .skip(1)
        .filter(|column| !E::IMMUTABLE.contains(*column))
        .filter_map(|column| placeholder(*column).map(|param| format!("{column} = {param}")))
        .join(", ");
    let mut filter = format!("{} = $1", E::id_column());
    if let Some(parent) = E::PARENT_COLUMN {
        if let Some(param) = placeholder(parent) {
            filter.push_str(&format!(" AND {parent} = {param}"));
        }
    }
    format!(
        "UPDATE {table} SET {assignments} WHERE {filter} RETURNING {columns}",
        table = E::TABLE,
        columns = select_list::<E>(),
    )
}

/// ORDER BY / LIMIT / OFFSET tail. Limit and offset bind at `$first_param`.
fn window_sql<E: PgEntity>(page: &PageSpec, first_param: usize) -> Result<String> {
    let mut order = Vec::new();
    if let Some(sort) = &page.sort {
        if !E::COLUMNS.contains(&sort.field.as_str()) {
            return Err(anyhow!("{} has no column {}", E::TABLE, sort.field));
        }
        order.push(format!("{} {}", sort.field, sort.direction.as_sql()));
    }
    order.push("created_at".to_string());
    order.push(E::id_column().to_string());
    Ok(format!(
        " ORDER BY {} LIMIT ${} OFFSET ${}",
        order.join(", "),
        first_param,
        first_param + 1
    ))
}

fn as_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait::async_trait]
impl<E: PgEntity> EntityStore<E> for PostgresStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_list::<E>(),
            E::TABLE,
            E::id_column()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch {}", E::ENTITY))?;

        row.as_ref().map(E::from_row).transpose()
    }

    async fn save(&self, entity: E) -> Result<E> {
        let sql = upsert_sql::<E>();
        let row = entity
            .bind(sqlx::query(&sql))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| classify(err, format!("Failed to save {}", E::ENTITY)))?;

        E::from_row(&row)
    }

    async fn update(&self, entity: E) -> Result<Option<E>> {
        let sql = update_sql::<E>();
        let row = entity
            .bind(sqlx::query(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| classify(err, format!("Failed to update {}", E::ENTITY)))?;

        row.as_ref().map(E::from_row).transpose()
    }

    async fn delete(&self, entity: &E) -> Result<bool> {
        let mut sql = format!("DELETE FROM {} WHERE {} = $1", E::TABLE, E::id_column());
        let parent = E::PARENT_COLUMN.zip(entity.parent_key());
        if let Some((column, _)) = parent {
            sql.push_str(&format!(" AND {column} = $2"));
        }

        let mut query = sqlx::query(&sql).bind(entity.id());
        if let Some((_, parent_id)) = parent {
            query = query.bind(parent_id);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|err| classify(err, format!("Failed to delete {}", E::ENTITY)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_unique_key(&self, key: &str) -> Result<bool> {
        let Some(column) = E::UNIQUE_COLUMN else {
            return Ok(false);
        };
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1) AS taken",
            E::TABLE,
            column
        );
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to check {} uniqueness", E::ENTITY))?;

        Ok(row.try_get("taken")?)
    }
}

#[async_trait::async_trait]
impl<E: PgEntity + ChildRecord> ChildStore<E> for PostgresStore {
    async fn find_by_parent_id(&self, parent_id: Uuid, page: &PageSpec) -> Result<Vec<E>> {
        let parent = E::PARENT_COLUMN
            .ok_or_else(|| anyhow!("{} has no parent column", E::TABLE))?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1{}",
            select_list::<E>(),
            E::TABLE,
            parent,
            window_sql::<E>(page, 2)?
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .bind(as_i64(page.limit))
            .bind(as_i64(page.offset))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {} rows", E::ENTITY))?;

        rows.iter().map(E::from_row).collect()
    }

    async fn count_by_parent_id(&self, parent_id: Uuid) -> Result<u64> {
        let parent = E::PARENT_COLUMN
            .ok_or_else(|| anyhow!("{} has no parent column", E::TABLE))?;
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = $1", E::TABLE, parent);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {} rows", E::ENTITY))?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl<E: PgEntity + TenantRecord> TenantStore<E> for PostgresStore {
    async fn find_page(&self, tenant_id: Option<&str>, page: &PageSpec) -> Result<Vec<E>> {
        let tenant = E::TENANT_COLUMN
            .ok_or_else(|| anyhow!("{} has no tenant column", E::TABLE))?;
        let sql = format!(
            "SELECT {} FROM {} WHERE ($1::text IS NULL OR {} = $1){}",
            select_list::<E>(),
            E::TABLE,
            tenant,
            window_sql::<E>(page, 2)?
        );
        let rows = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(as_i64(page.limit))
            .bind(as_i64(page.offset))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {} rows", E::ENTITY))?;

        rows.iter().map(E::from_row).collect()
    }

    async fn count(&self, tenant_id: Option<&str>) -> Result<u64> {
        let tenant = E::TENANT_COLUMN
            .ok_or_else(|| anyhow!("{} has no tenant column", E::TABLE))?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::text IS NULL OR {} = $1)",
            E::TABLE,
            tenant
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {} rows", E::ENTITY))?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductFeature, ProductSubtype};
    use crate::pagination::{PageRequest, SortDirection};

    #[test]
    fn test_upsert_keeps_immutable_columns() {
        let sql = upsert_sql::<ProductSubtype>();
        assert!(sql.starts_with("INSERT INTO product_subtypes (subtype_id, category_id, name"));
        assert!(sql.contains("ON CONFLICT (subtype_id) DO UPDATE SET name = EXCLUDED.name"));
        assert!(!sql.contains("category_id = EXCLUDED"));
        assert!(!sql.contains("created_at = EXCLUDED"));
        assert!(sql.contains("updated_at = EXCLUDED.updated_at"));
        assert!(sql.contains("$6"));
        assert!(!sql.contains("$7"));
    }

    #[test]
    fn test_update_is_guarded_by_id_and_parent() {
        let sql = update_sql::<ProductSubtype>();
        assert_eq!(
            sql,
            "UPDATE product_subtypes SET name = $3, description = $4, updated_at = $6 \
             WHERE subtype_id = $1 AND category_id = $2 \
             RETURNING subtype_id, category_id, name, description, created_at, updated_at"
        );
        assert!(!sql.contains("INSERT"));
    }

    #[test]
    fn test_window_orders_by_sort_then_creation() {
        let page = PageRequest::new(2, 10, 100)
            .unwrap()
            .with_sort("name", SortDirection::Desc)
            .spec();
        let sql = window_sql::<ProductFeature>(&page, 2).unwrap();
        assert_eq!(
            sql,
            " ORDER BY name DESC, created_at, product_feature_id LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_window_rejects_unknown_column() {
        let page = PageRequest::first(10)
            .unwrap()
            .with_sort("name; DROP TABLE products", SortDirection::Asc)
            .spec();
        assert!(window_sql::<ProductFeature>(&page, 2).is_err());
    }
}
