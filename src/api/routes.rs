use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::api::handlers;
use crate::api::state::{
    AppState, Bundles, Categories, Configurations, DocumentationRequirements, Features,
    Localizations, Products, Relationships, ScopedResource, Subtypes, TopLevelResource, Versions,
};

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Top-level catalog records
        .merge(top_level_routes::<Products>("/products", "product_id"))
        .merge(top_level_routes::<Categories>("/categories", "category_id"))
        .merge(top_level_routes::<Bundles>("/bundles", "bundle_id"))
        // Records owned by a category
        .merge(scoped_routes::<Subtypes>("/categories/:category_id/subtypes"))
        // Records owned by a product
        .merge(scoped_routes::<Features>("/products/:product_id/features"))
        .merge(scoped_routes::<Versions>("/products/:product_id/versions"))
        .merge(scoped_routes::<Localizations>("/products/:product_id/localizations"))
        .merge(scoped_routes::<Relationships>("/products/:product_id/relationships"))
        .merge(scoped_routes::<Configurations>("/products/:product_id/configurations"))
        .merge(scoped_routes::<DocumentationRequirements>(
            "/products/:product_id/documentation-requirements",
        ))
}

/// Router with CORS and the per-request timeout applied, ready to serve.
pub fn build_app(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_router()
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

// The item parameter must match the one nested routes use under the same prefix.
fn top_level_routes<R: TopLevelResource>(collection: &str, id_param: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            collection,
            get(handlers::list_records::<R>).post(handlers::create_record::<R>),
        )
        .route(
            &format!("{collection}/:{id_param}"),
            get(handlers::get_record::<R>)
                .put(handlers::update_record::<R>)
                .patch(handlers::update_record::<R>)
                .delete(handlers::delete_record::<R>),
        )
}

fn scoped_routes<R: ScopedResource>(collection: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            collection,
            get(handlers::list_children::<R>).post(handlers::create_child::<R>),
        )
        .route(
            &format!("{collection}/:id"),
            get(handlers::get_child::<R>)
                .put(handlers::update_child::<R>)
                .patch(handlers::update_child::<R>)
                .delete(handlers::delete_child::<R>),
        )
}
