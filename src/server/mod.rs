//! HTTP surface for the note service.

mod error;
mod extract;
mod routes;

pub use error::ApiError;

use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, SharenoteError};
use crate::service::NoteService;
use routes::{
    create_note_handler, delete_note_handler, delete_shared_note_handler, get_note_handler,
    get_shared_note_handler, list_notes_handler, root_handler, update_note_handler,
};

#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
}

/// Build the application router with CORS and request tracing.
pub fn build_router(notes: NoteService, cors_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(cors_origins)?;

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/notes", post(create_note_handler).get(list_notes_handler))
        .route(
            "/notes/{id}",
            get(get_note_handler)
                .put(update_note_handler)
                .delete(delete_note_handler),
        )
        .route(
            "/share/{share_id}",
            get(get_shared_note_handler).delete(delete_shared_note_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { notes });

    Ok(app)
}

/// Any origin when `origins` is empty, otherwise exactly those origins with
/// credentials allowed.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let max_age = Duration::from_secs(60 * 60);

    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(max_age));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|e| {
                SharenoteError::Config(format!("invalid CORS origin '{origin}': {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(max_age))
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config, notes: NoteService) -> Result<()> {
    let app = build_router(notes, &config.cors_origins)?;

    let address = config.address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
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
