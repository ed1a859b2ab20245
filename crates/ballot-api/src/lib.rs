pub mod error;
pub mod middleware;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use ballot_core::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/polls",
            get(routes::polls::list_my_polls).post(routes::polls::create_poll),
        )
        .route("/api/polls/public", get(routes::polls::list_public_polls))
        .route(
            "/api/polls/{id}",
            get(routes::polls::get_poll)
                .put(routes::polls::update_poll)
                .delete(routes::polls::delete_poll),
        )
        .route(
            "/api/polls/{id}/vote",
            post(routes::votes::cast_vote).get(routes::votes::my_vote),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
