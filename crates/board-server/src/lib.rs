pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(data_path: PathBuf) -> Router {
    let app_state = state::AppState::new(data_path);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        // Whole document
        .route("/data", get(routes::data::get_data))
        .route("/data", post(routes::data::post_data))
        // Collections
        .route("/missions", get(routes::missions::list_missions))
        .route("/missions", post(routes::missions::post_missions))
        .route("/profiles", get(routes::profiles::list_profiles))
        .route("/profiles", post(routes::profiles::post_profiles))
        .layer(cors)
        .with_state(app_state)
}

/// Start the dev data server on `port`, backed by the JSON file at
/// `data_path`.
pub async fn serve(data_path: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(data_path.clone());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        data = %data_path.display(),
        "board data server listening on http://localhost:{port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
