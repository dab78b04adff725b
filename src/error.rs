use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreConflict;

/// Outcome taxonomy shared by every catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The record does not exist, or exists under a different parent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{context}")]
    Unexpected {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Discriminant callers branch on without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Unexpected,
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CatalogError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CatalogError::Conflict(message.into())
    }

    /// Classify a store failure. Constraint violations reported by the store
    /// become `Conflict`; anything else is wrapped as `Unexpected`.
    pub fn from_store(context: impl Into<String>, err: anyhow::Error) -> Self {
        let context = context.into();
        if let Some(conflict) = err.downcast_ref::<StoreConflict>() {
            return CatalogError::Conflict(format!("{context}: {conflict}"));
        }
        CatalogError::Unexpected {
            context,
            source: err.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn store_conflicts_are_classified_as_conflict() {
        let err = anyhow::Error::new(StoreConflict::Unique("product_subtype_name_key".to_string()));
        let classified = CatalogError::from_store("Failed to save product subtype", err);
        assert_eq!(classified.kind(), ErrorKind::Conflict);
        assert!(classified.to_string().contains("product_subtype_name_key"));
    }

    #[test]
    fn other_store_failures_keep_their_cause() {
        let err = anyhow::anyhow!("connection reset by peer");
        let classified = CatalogError::from_store("Failed to fetch product", err);
        assert_eq!(classified.kind(), ErrorKind::Unexpected);
        assert_eq!(classified.to_string(), "Failed to fetch product");
        let source = classified.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection reset by peer"));
    }
}
