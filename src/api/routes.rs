use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, AppState};
use crate::store::traits::RecordStore;

/// Build the router. `prefix` is prepended to every route and must not end
/// with a slash (empty serves at the root).
pub fn create_router<S: RecordStore + 'static>(prefix: &str) -> Router<AppState<S>> {
    let mut router = Router::new()
        // Health check
        .route(&format!("{}/health", prefix), get(handlers::health_check))
        .route(&format!("{}/", prefix), get(handlers::root::<S>))
        // Resource listing (trailing slash kept for older clients)
        .route(&format!("{}/:resource", prefix), get(handlers::list_records::<S>))
        .route(&format!("{}/:resource/", prefix), get(handlers::list_records::<S>))
        // Single-field updates
        .route(
            &format!("{}/:resource/:id/:field", prefix),
            patch(handlers::update_field::<S>),
        );

    if !prefix.is_empty() {
        router = router.route(prefix, get(handlers::root::<S>));
    }

    router.layer(CorsLayer::permissive())
}
