use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;

mod auth {
    pub mod csrf;
    pub mod password;
    pub mod session;
    pub mod share;
}

mod models {
    pub mod atendimento;
    pub mod diagnostico;
    pub mod file;
    pub mod patient;
}

mod repositories {
    pub mod atendimento;
    pub mod diagnostico;
    pub mod file;
    pub mod heartbeat;
    pub mod patient;
}

mod services {
    pub mod files;
    pub mod share;
}

mod handlers {
    pub mod atendimentos;
    pub mod auth;
    pub mod diagnosticos;
    pub mod files;
    pub mod health;
    pub mod patients;
    pub mod share;
}

mod middleware_layer {
    pub mod auth;
    pub mod csrf;
}

mod validation {
    pub mod auth;
    pub mod share;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config)?;
    tracing::info!("✅ AppState initialized");

    tokio::fs::create_dir_all(&config.storage_dir).await?;
    tracing::info!("✅ Storage directory ready: {}", config.storage_dir.display());

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
            "x-csrf-token".parse().unwrap(),
        ])
        .allow_credentials(true)
        .expose_headers(["x-csrf-token".parse().unwrap()])
        .max_age(Duration::from_secs(86400));

    let login_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.login_rate_per_second)
            .burst_size(config.login_rate_burst)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(tower_governor::GovernorLayer::new(login_governor_conf))
        .with_state(state.clone());

    let share_routes = Router::new()
        .route(
            "/api/share/{token}",
            get(handlers::share::check).post(handlers::share::access),
        )
        .with_state(state.clone());

    let ops_routes = Router::new()
        .route("/api/cron/heartbeat", get(handlers::health::heartbeat))
        .route(
            "/api/diagnostics/database",
            get(handlers::health::database_diagnostics),
        )
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::session_info))
        .route("/api/share", post(handlers::share::generate))
        .route(
            "/api/patients",
            get(handlers::patients::list).post(handlers::patients::create),
        )
        .route(
            "/api/patients/{id}",
            get(handlers::patients::get)
                .put(handlers::patients::update)
                .delete(handlers::patients::delete),
        )
        .route(
            "/api/diagnosticos",
            get(handlers::diagnosticos::list).post(handlers::diagnosticos::create),
        )
        .route(
            "/api/diagnosticos/{id}",
            get(handlers::diagnosticos::get)
                .put(handlers::diagnosticos::update)
                .delete(handlers::diagnosticos::delete),
        )
        .route(
            "/api/atendimentos",
            get(handlers::atendimentos::list).post(handlers::atendimentos::create),
        )
        .route(
            "/api/atendimentos/{id}",
            get(handlers::atendimentos::get)
                .put(handlers::atendimentos::update)
                .delete(handlers::atendimentos::delete),
        )
        .route("/api/files/upload", post(handlers::files::upload))
        .route("/api/files/{id}/download", get(handlers::files::download))
        .route("/api/files/{id}", delete(handlers::files::delete))
        .route_layer(from_fn(middleware_layer::csrf::verify_csrf))
        .with_state(state.clone());

    let app = Router::new()
        .merge(login_routes)
        .merge(share_routes)
        .merge(ops_routes)
        .merge(protected_routes)
        .fallback_service(ServeDir::new("files/public"))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ All systems operational");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
