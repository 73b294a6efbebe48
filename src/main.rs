mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Category routes
        crate::handlers::category::list_categories,
        crate::handlers::category::create_category,
        // Post routes
        crate::handlers::post::list_posts,
        crate::handlers::post::get_post,
        crate::handlers::post::create_post,
        crate::handlers::post::update_post,
        crate::handlers::post::delete_post,
        crate::handlers::post::pin_post,
        crate::handlers::post::lock_post,
        // Reply routes
        crate::handlers::reply::list_replies,
        crate::handlers::reply::create_reply,
        crate::handlers::reply::delete_reply,
        // Like routes
        crate::handlers::like::toggle_like,
        // Admin routes
        crate::handlers::stats::get_stats,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::error::AppError,
            // Category
            crate::handlers::category::CategoryResponse,
            crate::handlers::category::CreateCategoryRequest,
            // Post
            crate::handlers::post::PostResponse,
            crate::handlers::post::CreatePostRequest,
            crate::handlers::post::UpdatePostRequest,
            crate::handlers::post::SetPinnedRequest,
            crate::handlers::post::SetLockedRequest,
            crate::handlers::post::PostListQuery,
            // Reply
            crate::handlers::reply::ReplyResponse,
            crate::handlers::reply::CreateReplyRequest,
            crate::handlers::reply::ReplyListQuery,
            // Like
            crate::handlers::like::ToggleLikeRequest,
            crate::handlers::like::LikeResponse,
            // Admin
            crate::handlers::stats::StatsResponse,
        )
    ),
    tags(
        (name = "categories", description = "Category operations"),
        (name = "posts", description = "Post management operations"),
        (name = "replies", description = "Reply management operations"),
        (name = "likes", description = "Like toggle operations"),
        (name = "admin", description = "Administrative operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let auth_config = config::auth::AuthConfig::from_env()?;
    config::auth::init_auth_config(auth_config)?;

    tracing::info!("Starting Agora API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app().layer(Extension(db));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Agora API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
