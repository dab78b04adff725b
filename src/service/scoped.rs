use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::mapping::ChildMapper;
use crate::model::{ChildRecord, Record};
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::ChildStore;

/// CRUD over records that live under a parent.
///
/// Every read, update and delete by id first checks that the stored record
/// belongs to the parent named in the request. A record owned by another
/// parent is reported exactly like a missing one.
pub struct ScopedCrudService<M>
where
    M: ChildMapper,
    M::Entity: ChildRecord,
{
    store: Arc<dyn ChildStore<M::Entity>>,
    mapper: M,
}

impl<M> ScopedCrudService<M>
where
    M: ChildMapper,
    M::Entity: ChildRecord,
{
    pub fn new(store: Arc<dyn ChildStore<M::Entity>>, mapper: M) -> Self {
        Self { store, mapper }
    }

    fn entity() -> &'static str {
        <M::Entity as Record>::ENTITY
    }

    pub async fn list(
        &self,
        parent_id: Uuid,
        request: &PageRequest,
    ) -> CatalogResult<Page<M::Dto>> {
        request.check_sort(<M::Entity as Record>::SORTABLE)?;
        debug!(
            "Listing {} rows of parent {} (page {}, size {})",
            Self::entity(),
            parent_id,
            request.page(),
            request.size()
        );

        let store = &self.store;
        paginate(
            request,
            move |spec| async move { store.find_by_parent_id(parent_id, &spec).await },
            move || store.count_by_parent_id(parent_id),
            |entity| self.mapper.to_dto(entity),
        )
        .await
        .map_err(|err| CatalogError::from_store(format!("Failed to list {}", Self::entity()), err))
    }

    pub async fn create(&self, parent_id: Uuid, mut dto: M::Dto) -> CatalogResult<M::Dto> {
        self.mapper.assign_parent(&mut dto, parent_id);

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
        info!("Created {} {} under {}", Self::entity(), saved.id(), parent_id);

        Ok(self.mapper.to_dto(saved))
    }

    pub async fn get(&self, parent_id: Uuid, id: Uuid) -> CatalogResult<M::Dto> {
        let entity = self.find_owned(parent_id, id).await?;
        Ok(self.mapper.to_dto(entity))
    }

    pub async fn update(&self, parent_id: Uuid, id: Uuid, dto: M::Dto) -> CatalogResult<M::Dto> {
        let mut entity = self.find_owned(parent_id, id).await?;
        self.mapper.merge(dto, &mut entity)?;

        let saved = self
            .store
            .update(entity)
            .await
            .map_err(|err| {
                CatalogError::from_store(format!("Failed to save {}", Self::entity()), err)
            })?
            .ok_or_else(|| CatalogError::not_found(Self::entity(), id))?;
        info!("Updated {} {} under {}", Self::entity(), id, parent_id);

        Ok(self.mapper.to_dto(saved))
    }

    pub async fn delete(&self, parent_id: Uuid, id: Uuid) -> CatalogResult<()> {
        let entity = self.find_owned(parent_id, id).await?;
        let deleted = self.store.delete(&entity).await.map_err(|err| {
            CatalogError::from_store(format!("Failed to delete {}", Self::entity()), err)
        })?;
        if !deleted {
            return Err(CatalogError::not_found(Self::entity(), id));
        }
        info!("Deleted {} {} under {}", Self::entity(), id, parent_id);

        Ok(())
    }

    async fn find_owned(&self, parent_id: Uuid, id: Uuid) -> CatalogResult<M::Entity> {
        let found = self.store.find_by_id(id).await.map_err(|err| {
            CatalogError::from_store(format!("Failed to fetch {}", Self::entity()), err)
        })?;

        match found {
            Some(entity) if entity.parent_id() == parent_id => Ok(entity),
            Some(_) => {
                debug!("{} {} is not owned by {}", Self::entity(), id, parent_id);
                Err(CatalogError::not_found(Self::entity(), id))
            }
            None => Err(CatalogError::not_found(Self::entity(), id)),
        }
    }
}
