use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::mapping::Mapper;
use crate::model::{Record, TenantRecord};
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::TenantStore;

/// CRUD over tenant-owned records that have no parent.
pub struct CatalogService<M>
where
    M: Mapper,
    M::Entity: TenantRecord,
{
    store: Arc<dyn TenantStore<M::Entity>>,
    mapper: M,
}

impl<M> CatalogService<M>
where
    M: Mapper,
    M::Entity: TenantRecord,
{
    pub fn new(store: Arc<dyn TenantStore<M::Entity>>, mapper: M) -> Self {
        Self { store, mapper }
    }

    fn entity() -> &'static str {
        <M::Entity as Record>::ENTITY
    }

    /// Page through records, optionally only those of one tenant.
    pub async fn list(
        &self,
        tenant_id: Option<&str>,
        request: &PageRequest,
    ) -> CatalogResult<Page<M::Dto>> {
        request.check_sort(<M::Entity as Record>::SORTABLE)?;
        debug!(
            "Listing {} rows for tenant {:?} (page {}, size {})",
            Self::entity(),
            tenant_id,
            request.page(),
            request.size()
        );

        let store = &self.store;
        paginate(
            request,
            move |spec| async move { store.find_page(tenant_id, &spec).await },
            move || store.count(tenant_id),
            |entity| self.mapper.to_dto(entity),
        )
        .await
        .map_err(|err| CatalogError::from_store(format!("Failed to list {}", Self::entity()), err))
    }

    pub async fn create(&self, dto: M::Dto) -> CatalogResult<M::Dto> {
        if let Some(key) = self.mapper.unique_key(&dto) {
            let taken = self.store.exists_by_unique_key(key).await.map_err(|err| {
                CatalogError::from_store(format!("Failed to probe {}", Self::entity()), err)
            })?;
            if taken {
                return Err(CatalogError::conflict(format!(
                    "{} '{}' already exists",
                    Self::entity(),
                    key
                )));
            }
        }

        let entity = self.mapper.to_entity(dto)?;
        let saved = self.store.save(entity).await.map_err(|err| {
            CatalogError::from_store(format!("Failed to save {}", Self::entity()), err)
        })?;
        info!(
            "Created {} {} for tenant {}",
            Self::entity(),
            saved.id(),
            saved.tenant_id()
        );

        Ok(self.mapper.to_dto(saved))
    }

    pub async fn get(&self, id: Uuid) -> CatalogResult<M::Dto> {
        let entity = self.find(id).await?;
        Ok(self.mapper.to_dto(entity))
    }

    pub async fn update(&self, id: Uuid, dto: M::Dto) -> CatalogResult<M::Dto> {
        let mut entity = self.find(id).await?;
        self.mapper.merge(dto, &mut entity)?;

        let saved = self
            .store
            .update(entity)
            .await
            .map_err(|err| {
                CatalogError::from_store(format!("Failed to save {}", Self::entity()), err)
            })?
            .ok_or_else(|| CatalogError::not_found(Self::entity(), id))?;
        info!("Updated {} {}", Self::entity(), id);

        Ok(self.mapper.to_dto(saved))
    }

    pub async fn delete(&self, id: Uuid) -> CatalogResult<()> {
        let entity = self.find(id).await?;
        let deleted = self.store.delete(&entity).await.map_err(|err| {
            CatalogError::from_store(format!("Failed to delete {}", Self::entity()), err)
        })?;
        if !deleted {
            return Err(CatalogError::not_found(Self::entity(), id));
        }
        info!("Deleted {} {}", Self::entity(), id);

        Ok(())
    }

    async fn find(&self, id: Uuid) -> CatalogResult<M::Entity> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|err| {
                CatalogError::from_store(format!("Failed to fetch {}", Self::entity()), err)
            })?
            .ok_or_else(|| CatalogError::not_found(Self::entity(), id))
    }
}
