//! # Mikrozaim
//!
//! Lead-generation quiz funnel for micro-loan offers plus the admin panel
//! behind it.
//!
//!
//!
//! # General Infrastructure
//! - The frontend is a thin static page; every state transition goes through
//!   this service
//! - Persistence, auth and file storage live on the hosted data platform
//!   (table API + object storage); this service is a typed facade over it
//! - The platform is the single source of truth; we only assume a read
//!   reflects the last write this session acknowledged
//!
//!
//!
//! # Flow
//!
//! - Visitor starts the quiz, answers six questions (country first)
//! - On completion the captured country selects the active offers, ordered
//!   by display rank
//! - The admin panel edits the same table per country: add, edit, delete,
//!   drag-reorder with a single batched rank write
use std::{sync::Arc, time::Duration};

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{delete, get, post},
    Router,
};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod admin;
pub mod config;
pub mod error;
pub mod host;
pub mod offers;
pub mod presentation;
pub mod quiz;
pub mod recent;
pub mod repository;
pub mod routes;
pub mod state;

use host::EnvHost;
use routes::{
    admin_offers, answer, back, create_session, delete_offer, login, public_offers, quiz_view,
    reorder_offers, require_admin, reset, save_offer, upload_logo,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/offers", get(admin_offers).post(save_offer))
        .route("/offers/reorder", post(reorder_offers))
        .route("/offers/{id}", delete(delete_offer))
        .route("/offers/{id}/logo", post(upload_logo))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/quiz", post(create_session))
        .route("/quiz/{id}", get(quiz_view))
        .route("/quiz/{id}/answer", post(answer))
        .route("/quiz/{id}/back", post(back))
        .route("/quiz/{id}/reset", post(reset))
        .route("/offers", get(public_offers))
        .route("/login", get(login))
        .nest("/admin", admin_routes)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    host::announce(&EnvHost);

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let app = app(state.clone()).layer(cors);

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
