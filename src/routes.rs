// src/routes.rs

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::quiz;
use crate::state::AppState;

/// Assembles the main application router.
///
/// * Mounts the quiz session surface under /api/quiz.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, clock, chat client, pool cache).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let quiz_routes = Router::new()
        .route("/daily", get(quiz::get_daily_questions))
        .route("/answer", post(quiz::submit_answer))
        .route("/explanation", get(quiz::get_explanation))
        .route("/regenerate", post(quiz::regenerate_questions));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
