//! Quizroom API: HTTP and WebSocket surface of the quiz engine.
//!
//! Moderators drive transitions over `/api/v1/moderator`, the bot bridge
//! forwards participant input to `/api/v1/participants`, and public displays
//! read `/api/v1/display` or stay connected on `/ws`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod transport;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the display origin once it is configurable.
    Router::new()
        .merge(routes::health::router())
        .merge(routes::display::router())
        .nest("/api/v1/moderator", routes::moderator::router())
        .nest("/api/v1/participants", routes::participants::router())
        .nest("/api/v1/scenario", routes::scenario::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
