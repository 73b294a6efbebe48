use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let public_read = public_read_routes();
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    public_read.merge(protected)
}

/// Public reads. Authentication is optional here; a valid token enriches
/// responses with `is_liked` and deduplicates view counting.
fn public_read_routes() -> Router {
    Router::new()
        .route(
            "/categories",
            routing::get(handlers::category::list_categories),
        )
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post))
        .route(
            "/posts/{post_id}/replies",
            routing::get(handlers::reply::list_replies),
        )
}

/// Authenticated writes.
fn protected_routes() -> Router {
    Router::new()
        // Categories (admin only - checked in handler)
        .route(
            "/categories",
            routing::post(handlers::category::create_category),
        )
        // Posts
        .route("/posts", routing::post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            routing::put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        .route("/posts/{id}/pin", routing::put(handlers::post::pin_post))
        .route("/posts/{id}/lock", routing::put(handlers::post::lock_post))
        // Replies
        .route(
            "/posts/{post_id}/replies",
            routing::post(handlers::reply::create_reply),
        )
        .route(
            "/replies/{id}",
            routing::delete(handlers::reply::delete_reply),
        )
        // Likes
        .route("/likes", routing::post(handlers::like::toggle_like))
        // Admin
        .route("/admin/stats", routing::get(handlers::stats::get_stats))
}
