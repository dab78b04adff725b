//! CRUD services sitting between the HTTP handlers and the stores.

pub mod scoped;
pub mod top_level;

pub use scoped::ScopedCrudService;
pub use top_level::CatalogService;
