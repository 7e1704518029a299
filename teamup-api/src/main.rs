use axum::routing::{get, post, put};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use teamup_api::config::AppConfig;
use teamup_api::routes::{auth, feed, games, health, matches, messages, moderation, profile, swipe};
use teamup_api::socket::handlers::ws_upgrade;
use teamup_api::socket::registry::ConnectionRegistry;
use teamup_api::store::postgres::PgStore;
use teamup_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    teamup_shared::middleware::init_tracing("teamup-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.db_pool_size)
        .build(manager)?;
    tracing::info!(pool_size = config.db_pool_size, "database pool ready");

    let metrics_handle = teamup_shared::middleware::init_metrics();

    let state = Arc::new(AppState {
        store: Arc::new(PgStore::new(pool)),
        registry: ConnectionRegistry::new(),
        metrics_handle,
        config,
    });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route(
            "/me/profile",
            put(profile::put_profile).patch(profile::patch_profile),
        )
        .route("/games", get(games::list_games))
        .route("/feed", get(feed::get_feed))
        .route("/swipe", post(swipe::swipe))
        .route("/matches", get(matches::list_matches))
        .route(
            "/matches/:id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/moderation/block", post(moderation::block_user))
        .route("/moderation/report", post(moderation::report_user))
        .route("/ws", get(ws_upgrade))
        .layer(axum::middleware::from_fn(
            teamup_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "teamup-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
