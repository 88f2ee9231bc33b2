use clap::Parser; // for cli
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passcraft_api::{AppState, Args, RateLimiter, UpdateSource, build_store, router};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passcraft_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();
    args.validate()?;

    let client = reqwest::Client::new();
    let store = build_store(&args, &client).await?;
    let rate_limiter = RateLimiter::new(
        store,
        args.window_policy(),
        args.fail_policy,
        args.store_timeout(),
    );

    // creating shared state
    let state = Arc::new(AppState {
        client,
        rate_limiter,
        allowed_origins: args.origins(),
        update: UpdateSource {
            current_version: args.current_version.clone(),
            version_url: args.version_url.clone(),
            download_url: args.download_url.clone(),
        },
        static_dir: PathBuf::from(&args.static_dir),
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("PassCraft API running on http://{addr}");
    tracing::info!(store = ?args.store, fail_policy = ?args.fail_policy, "counter store");
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    tracing::info!("Allowed origins: {}", args.origins().join(", "));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
