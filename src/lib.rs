//! PassCraft API: password generation behind an origin check and a
//! fixed-window rate limiter shared across instances through a counter store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod state;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, get_service},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

pub use config::{Args, StoreKind};
pub use rate_limit::{FailPolicy, RateLimiter, WindowPolicy};
pub use state::{AppState, UpdateSource};
pub use store::{CounterStore, MemoryStore, RedisStore, StoreError, UpstashStore};

/// Builds the counter store selected by `args`.
pub async fn build_store(
    args: &Args,
    client: &reqwest::Client,
) -> Result<Arc<dyn CounterStore>, StoreError> {
    let store: Arc<dyn CounterStore> = match args.store {
        StoreKind::Upstash => Arc::new(UpstashStore::new(
            client.clone(),
            args.upstash_url.clone().unwrap_or_default(),
            args.upstash_token.clone().unwrap_or_default(),
        )),
        StoreKind::Redis => Arc::new(RedisStore::connect(&args.redis_url).await?),
        StoreKind::Memory => {
            tracing::warn!("in-memory counter store: rate limits are not shared between instances");
            let store = Arc::new(MemoryStore::new());
            store.spawn_purger(Duration::from_secs(60));
            store
        }
    };
    Ok(store)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
}

/// The HTTP application. Serve it with connect info, `/generate` reads the
/// peer address.
pub fn router(state: Arc<AppState>) -> Router {
    let favicon = state.static_dir.join("favicon.ico");
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/favicon.ico", get_service(ServeFile::new(favicon)))
        .route("/check-update", get(handlers::check_update_handler))
        .route("/generate", get(handlers::generate_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
