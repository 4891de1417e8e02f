// backend/tests/helpers.rs
#![allow(dead_code)]

use backend::{
    config::{AppConfig, AuthConfig, DatabaseConfig, WebConfig},
    db,
    web_server::AppState,
};
use chrono::NaiveDate;
use reqwest::{header, Response};
use sqlx::SqlitePool;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

pub const TEST_USERNAME: &str = "me1";
pub const TEST_PASSWORD: &str = "password";

pub fn test_config(port: u16) -> AppConfig {
    AppConfig {
        web: WebConfig {
            addr: "127.0.0.1".to_string(),
            port,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            // Lowest cost bcrypt accepts, to keep the suite fast.
            bcrypt_cost: 4,
            cookie_name: "books_session".to_string(),
            cookie_secure: false,
            session_ttl_days: 14,
        },
    }
}

/// A fresh, migrated in-memory database.
pub async fn test_state(port: u16) -> AppState {
    let config = test_config(port);

    let db_pool = db::connect(&config.database)
        .await
        .expect("Failed to create in-memory database pool.");

    db::migrate(&db_pool)
        .await
        .expect("Failed to run migrations on test database.");

    AppState {
        db_pool,
        app_config: config,
    }
}

/// Spawn a test server and return the address, a reqwest client and the pool.
///
/// The client keeps cookies, so it behaves like one browser, and does not
/// follow redirects, so tests can assert on the 302 itself.
pub async fn spawn_app() -> (SocketAddr, reqwest::Client, SqlitePool) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let app_state = test_state(addr.port()).await;
    let db_pool = app_state.db_pool.clone();

    let app = backend::web_server::create_router(app_state);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    (addr, client, db_pool)
}

/// Inserts `me1` / `password` directly, bypassing the signup route.
pub async fn create_user(db_pool: &SqlitePool) -> i64 {
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(TEST_USERNAME)
        .bind(password_hash)
        .execute(db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Two authors with one book each; returns the book ids.
pub async fn create_books(db_pool: &SqlitePool) -> (i64, i64) {
    let harper = insert_author(db_pool, "Harper Lee").await;
    let mockingbird = insert_book(
        db_pool,
        "To Kill a Mockingbird",
        NaiveDate::from_ymd_opt(1960, 7, 11),
        harper,
    )
    .await;

    let sylvia = insert_author(db_pool, "Sylvia Plath").await;
    let bell_jar = insert_book(db_pool, "The Bell Jar", None, sylvia).await;

    (mockingbird, bell_jar)
}

pub async fn insert_author(db_pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO authors (name) VALUES ($1)")
        .bind(name)
        .execute(db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn insert_book(
    db_pool: &SqlitePool,
    title: &str,
    publish_date: Option<NaiveDate>,
    author_id: i64,
) -> i64 {
    sqlx::query("INSERT INTO books (title, publish_date, author_id) VALUES ($1, $2, $3)")
        .bind(title)
        .bind(publish_date)
        .bind(author_id)
        .execute(db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Follows a redirect response with a GET, like a browser would.
pub async fn follow(addr: &SocketAddr, client: &reqwest::Client, response: Response) -> Response {
    let target = location(&response);
    client
        .get(format!("http://{addr}{target}"))
        .send()
        .await
        .expect("Failed to follow redirect")
}

/// Logs the client in as `me1`, asserting the redirect home.
pub async fn log_in(addr: &SocketAddr, client: &reqwest::Client) {
    let response = client
        .post(format!("http://{addr}/login"))
        .form(&[("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
        .send()
        .await
        .expect("Failed to execute login request.");

    assert_eq!(response.status(), reqwest::StatusCode::FOUND, "Login should redirect");
    assert_eq!(location(&response), "/");
}
