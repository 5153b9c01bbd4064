//! # atelier-server: HTTP API for Atelier POS
//!
//! Wires `atelier-db` and `atelier-core` behind an axum router. The binary
//! in `main.rs` adds config loading, logging and the listener; tests build
//! the same router over an in-memory database.
//!
//! ```rust,ignore
//! let db = Database::new(config.db_config()).await?;
//! let app = atelier_server::app(AppState::new(db, config).shared());
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, SharedState};

/// Builds the full router with request tracing and CORS for browser terminals.
pub fn app(state: SharedState) -> Router {
    routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
