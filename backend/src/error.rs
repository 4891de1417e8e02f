use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::pages;

// Define a custom error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Database error")]
    DatabaseError(sqlx::Error),

    #[error("Password hashing error")]
    PasswordError(bcrypt::BcryptError),

    #[error("Login required")]
    LoginRequired { next: String },

    #[error("Resource not found")]
    NotFound,
}

/// Left on the extensions of a rendered error page, so `auth::session_middleware`
/// can redraw it with the visitor's navigation.
#[derive(Clone, Copy, Debug)]
pub struct ErrorPage {
    pub message: &'static str,
}

/// Failures of the signup and login forms. The first three are shown to the
/// user inside the form they submitted; `App` is an infrastructure failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("That username is taken. Please choose a different one.")]
    UsernameTaken,

    #[error("No user with that username. Please try again.")]
    UnknownUsername,

    #[error("Password doesn't match. Please try again.")]
    PasswordMismatch,

    #[error(transparent)]
    App(#[from] AppError),
}

// Implement IntoResponse to convert AppError into an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
            AppError::PasswordError(e) => {
                tracing::error!("Password error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
            AppError::LoginRequired { next } => {
                let location = format!("/login?next={}", pages::encode_query(&next));
                return pages::found(&location);
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found."),
        };

        let mut response = (status, Html(pages::error_page(status, error_message, None))).into_response();
        response.extensions_mut().insert(ErrorPage {
            message: error_message,
        });
        response
    }
}

// Add From implementations for easy '?' conversion in handlers
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::PasswordError(e)
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::App(e.into())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AuthError::App(e.into())
    }
}
