use crate::infrastructure::http::controllers;
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/posts/:id/hashtags",
            post(controllers::hashtags::add_hashtags_to_post),
        )
        .route(
            "/api/hashtags/trending",
            get(controllers::hashtags::get_trending_hashtags),
        )
        .route(
            "/api/hashtags/:name/posts",
            get(controllers::hashtags::search_by_hashtag),
        )
        .route(
            "/api/stories/:id/deletion",
            post(controllers::stories::schedule_story_deletion),
        )
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
