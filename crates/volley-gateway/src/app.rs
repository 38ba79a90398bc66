use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use volley_core::VolleyConfig;
use volley_dispatch::DispatchController;
use volley_storage::ConfigStore;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: VolleyConfig,
    pub dispatch: DispatchController,
    pub store: ConfigStore,
}

impl AppState {
    pub fn new(config: VolleyConfig, dispatch: DispatchController, store: ConfigStore) -> Self {
        Self {
            config,
            dispatch,
            store,
        }
    }
}

/// Assemble the full Axum router.
///
/// Everything under /api sits behind the identity middleware; /health and
/// the static /uploads mount do not.
pub fn build_router(state: Arc<AppState>) -> Router {
    let uploads_dir = state.config.uploads.dir.clone();

    let api = Router::new()
        .route(
            "/api/automation/start",
            post(crate::http::automation::start_handler),
        )
        .route(
            "/api/automation/stop",
            post(crate::http::automation::stop_handler),
        )
        .route(
            "/api/automation/status",
            get(crate::http::automation::status_handler),
        )
        .route(
            "/api/configs",
            get(crate::http::configs::list_handler).post(crate::http::configs::save_handler),
        )
        .route(
            "/api/configs/{id}",
            get(crate::http::configs::get_handler).delete(crate::http::configs::delete_handler),
        )
        .route(
            "/api/upload/images",
            post(crate::http::uploads::upload_handler),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            crate::auth::require_identity,
        ));

    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_dir),
        )
        .merge(api)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
