use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::{auth, catalog};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub app_config: AppConfig,
}

pub async fn run_server(app_state: AppState) -> Result<(), std::io::Error> {
    let web = &app_state.app_config.web;
    let listener = tokio::net::TcpListener::bind((web.addr.as_str(), web.port)).await?;
    tracing::info!("Serving books at http://{}", listener.local_addr()?);

    let app = create_router(app_state);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}

pub fn create_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout));

    let catalog_routes = Router::new()
        .route("/", get(catalog::home))
        .route("/book/{id}", get(catalog::book_detail).post(catalog::update_book))
        .route("/create_book", get(catalog::create_book_page).post(catalog::create_book))
        .route("/create_author", get(catalog::create_author_page).post(catalog::create_author))
        .route("/profile/{username}", get(catalog::profile));

    // Every route sees the session, so pages can render the right navigation.
    auth_routes
        .merge(catalog_routes)
        .fallback(catalog::not_found)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
