//! HTTP gateway for the university backend.
//!
//! Exposes the identity, person and academic services as one REST API with
//! JWT authentication, permission checks, Redis-backed rate limiting and an
//! OpenAPI description.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tracing::info;

pub use crate::middleware::{Cache, CurrentUser};
pub use crate::routes::create_router;
pub use crate::state::AppState;

/// Bind `addr` and serve the API until the process stops.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on {}", addr);

    // Connect info feeds the rate limiter and login audit when no proxy header is set.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
