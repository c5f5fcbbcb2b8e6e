//! API module
//!
//! HTTP endpoints standing in for the in-game economy commands.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::economy::EconomyService;
use crate::profile::InMemoryProfiles;

pub use routes::create_router;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub economy: EconomyService,
    /// Registry behind the economy's profile lookup, fed by account creation
    pub profiles: Arc<InMemoryProfiles>,
    /// Required on balance overrides when set
    pub admin_api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(economy: EconomyService, profiles: Arc<InMemoryProfiles>) -> Self {
        Self {
            economy,
            profiles,
            admin_api_key: None,
        }
    }

    pub fn with_admin_api_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.admin_api_key = Some(key.into());
        self
    }
}

/// Build the application router: `/health` plus the API under `/api/v1`.
pub fn build_app(state: AppState, permissive_cors: bool) -> Router {
    let api_routes = create_router(&state)
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    let router = if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
