use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, posts};

/// All API routes. Static files and transport layers are added by the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/signup", post(auth::signup))
        .route("/api/posts", get(posts::public_list))
        .route("/api/posts/get-body", post(posts::public_get_body));

    let protected_routes = Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/change-password", post(auth::change_password))
        .route("/api/admin/users", get(auth::list_users))
        .route("/api/work/upload", post(posts::upload))
        .route("/api/work/modify", post(posts::modify))
        .route("/api/work/delete", post(posts::delete))
        .route("/api/work/get-body", post(posts::get_body))
        .route("/api/work/posts", get(posts::list_all))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
