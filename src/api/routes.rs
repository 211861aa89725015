use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::session_middleware;

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
///
/// The session layer runs on every route so feedback and recommendations
/// share one opaque identity. CORS mirrors the origin because the browser
/// client sends the session cookie cross-origin.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Moods
        .route("/moods", get(handlers::get_moods))
        .route("/moods", post(handlers::create_mood))
        // Recommendations
        .route("/recommend", get(handlers::recommend))
        // Feedback
        .route("/feedback", post(handlers::record_feedback))
        .layer(middleware::from_fn(session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
