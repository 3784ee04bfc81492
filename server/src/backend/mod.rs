//! # Backend Module
//!
//! Wires the layers of the meal-credit service together:
//!
//! ```text
//! IO Layer (REST API, SSE)
//!     ↓
//! Domain Layer (services, session context, live feed)
//!     ↓
//! Storage Layer (SQLite record store, event hub)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::backend::domain::redemption_feed::run_live_feed;
use crate::backend::domain::{
    AdminService, AuthService, KioskService, LiveFeed, PinGenerator, PinService, RandomPinGenerator,
    SessionStore, SharedLiveFeed, StudentService, TopUpService,
};
use crate::backend::io::rest;
use crate::backend::storage::DbConnection;
use crate::config::Config;

const SESSION_PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(600);

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService<DbConnection>,
    pub kiosk_service: KioskService<DbConnection>,
    pub top_up_service: TopUpService<DbConnection>,
    pub pin_service: PinService<DbConnection>,
    pub student_service: StudentService<DbConnection>,
    pub admin_service: AdminService<DbConnection>,
    pub live_feed: SharedLiveFeed,
}

impl AppState {
    pub fn new(db: DbConnection, sessions: SessionStore, pin_generator: Arc<dyn PinGenerator>) -> Self {
        let connection = Arc::new(db);
        let pin_service = PinService::new(connection.clone(), pin_generator);

        Self {
            auth_service: AuthService::new(connection.clone(), sessions),
            kiosk_service: KioskService::new(connection.clone()),
            top_up_service: TopUpService::new(connection.clone()),
            student_service: StudentService::new(connection.clone(), pin_service.clone()),
            pin_service,
            admin_service: AdminService::new(connection),
            live_feed: LiveFeed::shared(Utc::now()),
        }
    }
}

/// Open the database, build the services and start the live feed task
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database");
    config.prepare_database_dir()?;
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up domain services");
    let sessions = SessionStore::new(ChronoDuration::minutes(config.session_ttl_minutes));
    let state = AppState::new(db, sessions, Arc::new(RandomPinGenerator));

    state.admin_service.reconcile(&state.live_feed).await?;
    tokio::spawn(run_live_feed(
        state.admin_service.clone(),
        state.live_feed.clone(),
        config.feed_reconcile_interval,
    ));

    let auth_service = state.auth_service.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = auth_service.purge_expired_sessions();
            if purged > 0 {
                info!("Purged {} expired sessions", purged);
            }
        }
    });

    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: Option<&str>) -> Router {
    let api_routes = Router::new()
        .nest("/kiosk", rest::kiosk_apis::router())
        .nest("/parents", rest::parent_apis::router())
        .nest("/students", rest::student_apis::router())
        .nest("/top-up", rest::top_up_apis::router())
        .nest("/admin", rest::admin_apis::router())
        .nest("/logs", rest::logging_apis::router());

    let router = Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    match cors_origin.map(|origin| origin.parse::<HeaderValue>()) {
        Some(Ok(origin)) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        ),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS origin: {}", e);
            router
        }
        None => router,
    }
}
