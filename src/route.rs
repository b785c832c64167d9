//! Route definitions for the idea board API
//!
//! This module configures all HTTP routes and maps them to their respective
//! handlers. It creates the Axum router with the application state.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::database::AppState;
use crate::handler::{create_comment, create_idea, get_idea, list_ideas, root, seed, vote_idea};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Liveness/store probe
/// - `POST /api/ideas` - Submit a new idea
/// - `GET /api/ideas` - List ideas (timeframe/sort/limit query params)
/// - `GET /api/ideas/{id}` - One idea with its comments, newest first
/// - `POST /api/ideas/{id}/vote` - Cast a vote for the requesting IP
/// - `POST /api/comments` - Comment on an idea
/// - `POST /api/seed` - Seed sample ideas into an empty store
///
/// The API is fully open: the CORS layer allows any origin, method and
/// header, since voter identity comes from the IP and not from credentials.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/ideas", get(list_ideas).post(create_idea))
        .route("/ideas/{id}", get(get_idea))
        .route("/ideas/{id}/vote", post(vote_idea))
        .route("/comments", post(create_comment))
        .route("/seed", post(seed));

    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}
