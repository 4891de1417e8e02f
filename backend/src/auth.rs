use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bcrypt::{hash, verify};
use chrono::Duration;
use common::{utils::safe_redirect_target, Credentials, User};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::config::AuthConfig;
use crate::db::DbPool;
use crate::error::{AppError, AuthError, ErrorPage};
use crate::extractors::CurrentUser;
use crate::pages;
use crate::session;
use crate::web_server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Flattens validator output into the messages shown above a form.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {field}."),
            })
        })
        .collect();
    messages.sort();
    messages
}

async fn find_user(db_pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

/// Hashes the password and stores a new user. A taken username is a form
/// error, including when another signup claims it between check and insert.
pub async fn register_user(
    db_pool: &DbPool,
    config: &AuthConfig,
    credentials: &Credentials,
) -> Result<i64, AuthError> {
    if find_user(db_pool, &credentials.username).await?.is_some() {
        return Err(AuthError::UsernameTaken);
    }

    let password_hash = hash(&credentials.password, config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        AppError::PasswordError(e)
    })?;

    let inserted = sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(&credentials.username)
        .bind(&password_hash)
        .execute(db_pool)
        .await;

    match inserted {
        Ok(result) => Ok(result.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthError::UsernameTaken),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            Err(e.into())
        }
    }
}

/// Checks a username/password pair against the stored bcrypt hash.
pub async fn authenticate(db_pool: &DbPool, credentials: &Credentials) -> Result<User, AuthError> {
    let user = find_user(db_pool, &credentials.username)
        .await?
        .ok_or(AuthError::UnknownUsername)?;

    if !verify(&credentials.password, &user.password_hash)? {
        return Err(AuthError::PasswordMismatch);
    }

    Ok(user)
}

fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .build()
}

// --- Handlers ---

pub async fn signup_page(current: CurrentUser) -> Html<String> {
    Html(pages::signup(current.user(), "", &[]))
}

/// POST /signup
/// Creates the account and sends the user to the login page.
pub async fn signup(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let messages = validation_messages(&errors);
        return Ok(Html(pages::signup(current.user(), &form.username, &messages)).into_response());
    }

    tracing::info!("Signing up user: {}", &form.username);
    match register_user(&state.db_pool, &state.app_config.auth, &form).await {
        Ok(user_id) => {
            tracing::info!("Created user {} ({})", form.username, user_id);
            Ok(pages::found("/login"))
        }
        Err(AuthError::App(e)) => Err(e),
        Err(e) => {
            tracing::info!("Signup rejected for {}: {}", form.username, e);
            let page = pages::signup(current.user(), &form.username, &[e.to_string()]);
            Ok(Html(page).into_response())
        }
    }
}

pub async fn login_page(current: CurrentUser, Query(query): Query<LoginQuery>) -> Html<String> {
    let next = safe_redirect_target(query.next.as_deref());
    Html(pages::login(current.user(), "", next, &[]))
}

/// POST /login
/// Starts a session and redirects to `next` (when it is local) or home.
pub async fn login(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
    Form(form): Form<Credentials>,
) -> Result<Response, AppError> {
    let next = safe_redirect_target(query.next.as_deref());

    // Login only needs both fields present; length rules are for new accounts.
    if form.username.is_empty() || form.password.is_empty() {
        let messages = vec!["Username and password are required.".to_string()];
        let page = pages::login(current.user(), &form.username, next, &messages);
        return Ok(Html(page).into_response());
    }

    tracing::info!("Logging in user: {}", &form.username);
    let user = match authenticate(&state.db_pool, &form).await {
        Ok(user) => user,
        Err(AuthError::App(e)) => return Err(e),
        Err(e) => {
            tracing::info!("Login rejected for {}: {}", form.username, e);
            let page = pages::login(current.user(), &form.username, next, &[e.to_string()]);
            return Ok(Html(page).into_response());
        }
    };

    let auth = &state.app_config.auth;
    let token = session::create(&state.db_pool, user.id, Duration::days(auth.session_ttl_days)).await?;

    Ok((jar.add(session_cookie(auth, token)), pages::found(next.unwrap_or("/"))).into_response())
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let name = state.app_config.auth.cookie_name.clone();

    let Some(cookie) = jar.get(&name) else {
        return Ok(pages::found("/"));
    };

    session::destroy(&state.db_pool, cookie.value()).await?;
    tracing::info!("Session ended");

    let removal = Cookie::build((name, "")).path("/").build();
    Ok((jar.remove(removal), pages::found("/")).into_response())
}

// --- Middleware for session authentication ---

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match jar.get(&state.app_config.auth.cookie_name) {
        Some(cookie) => session::resolve(&state.db_pool, cookie.value()).await?,
        None => None,
    };

    request.extensions_mut().insert(CurrentUser(user.clone()));

    let mut response = next.run(request).await;

    // Error pages are rendered without request context; give them the right navigation.
    if let (Some(user), Some(page)) = (user.as_ref(), response.extensions().get::<ErrorPage>().copied()) {
        let body = pages::error_page(response.status(), page.message, Some(user));
        response.headers_mut().remove(header::CONTENT_LENGTH);
        *response.body_mut() = Body::from(body);
    }

    Ok(response)
}
