use crate::{error::AppError, web_server::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};

#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Whoever the session cookie belongs to, if anyone. Put into the request
/// extensions by `auth::session_middleware` on every request.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<AuthUser>);

impl CurrentUser {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // If the middleware did not run, this is a wiring bug rather than an anonymous visitor.
        let current = parts.extensions.get::<CurrentUser>().ok_or_else(|| {
            AppError::InternalServerError(
                "CurrentUser not found in request extensions. Is the session middleware missing?"
                    .into(),
            )
        })?;

        Ok(current.clone())
    }
}

// Requiring an AuthUser sends anonymous visitors to the login page, then back here.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        user.ok_or_else(|| AppError::LoginRequired {
            next: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
        })
    }
}
