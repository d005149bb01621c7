pub mod broadcast;
pub mod client;
pub mod embed;
pub mod error;
pub mod lessons;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod ws;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Real-time viewer connection
        .route("/ws", get(ws::ws_handler))
        // Lessons
        .route("/api/lessons", get(routes::lessons::list_lessons))
        .route("/api/lessons/{id}", get(routes::lessons::get_lesson))
        // Registers
        .route(
            "/api/modbus/registers",
            get(routes::registers::get_registers),
        )
        .route(
            "/api/modbus/write-coil",
            post(routes::registers::write_coil),
        )
        .route(
            "/api/modbus/write-register",
            post(routes::registers::write_register),
        )
        .fallback(embed::static_handler)
        .layer(cors)
        .with_state(state)
}

/// Start the lab server on the given port.
pub async fn serve(port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(AppState::new(), listener, open_browser).await
}

/// Start the lab server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state);

    tracing::info!("PLC lab server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
