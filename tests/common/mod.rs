#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static USER_COUNTER: AtomicUsize = AtomicUsize::new(1);
static CATEGORY_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = agora::config::auth::AuthConfig::from_env().unwrap();
        let _ = agora::config::auth::init_auth_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        agora::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(agora::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["read_records", "likes", "replies", "posts", "categories"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Mint an identity token for a fresh user id. Identity lives outside this
/// service, so tests stand in for the provider by signing tokens with the
/// shared secret.
pub fn mint_user(name_prefix: &str) -> (i32, String) {
    let user_id = USER_COUNTER.fetch_add(1, Ordering::SeqCst) as i32;
    let name = format!("{}_{}", name_prefix, user_id);
    let token = agora::config::auth::encode_identity_token(user_id, &name, None, "user")
        .expect("Failed to mint identity token");
    (user_id, token)
}

/// Mint an identity token carrying the admin role.
pub fn mint_admin(name_prefix: &str) -> (i32, String) {
    let user_id = USER_COUNTER.fetch_add(1, Ordering::SeqCst) as i32;
    let name = format!("{}_{}", name_prefix, user_id);
    let token = agora::config::auth::encode_identity_token(user_id, &name, None, "admin")
        .expect("Failed to mint identity token");
    (user_id, token)
}

/// Create a category via the admin endpoint and return its id.
pub async fn create_test_category(app: &TestApp, admin_token: &str) -> i32 {
    let counter = CATEGORY_COUNTER.fetch_add(1, Ordering::SeqCst);

    let resp = app
        .client
        .post(app.url("/categories"))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "name": format!("Test Category {}", counter),
            "description": "A test category"
        }))
        .send()
        .await
        .expect("Failed to create category");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create category: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Create a post and return its id.
pub async fn create_test_post(
    app: &TestApp,
    token: &str,
    category_id: i32,
    title: &str,
) -> i32 {
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "content": format!("Content of {}", title),
            "category_id": category_id
        }))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create post: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Create a reply and return its id.
pub async fn create_test_reply(
    app: &TestApp,
    token: &str,
    post_id: i32,
    parent_id: Option<i32>,
) -> i32 {
    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/replies", post_id)))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "content": "A test reply",
            "parent_id": parent_id
        }))
        .send()
        .await
        .expect("Failed to create reply");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create reply: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Fetch a single scalar from the database for direct-state assertions.
pub async fn query_scalar_i64(db: &DatabaseConnection, sql: &str, values: Vec<sea_orm::Value>) -> i64 {
    let row = db
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            values,
        ))
        .await
        .expect("Query failed")
        .expect("Query returned no row");
    row.try_get_by_index::<i64>(0)
        .or_else(|_| row.try_get_by_index::<i32>(0).map(|v| v as i64))
        .expect("Row missing scalar column")
}
