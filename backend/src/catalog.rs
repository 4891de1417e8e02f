use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::NaiveDate;
use common::{utils::parse_optional_date, Author, AuthorForm, Book, BookForm, BookWithAuthor, User};
use validator::Validate;

use crate::auth::validation_messages;
use crate::db::DbPool;
use crate::error::AppError;
use crate::extractors::{AuthUser, CurrentUser};
use crate::pages::{self, BookFields};
use crate::web_server::AppState;

const BOOK_WITH_AUTHOR: &str = "SELECT b.id, b.title, b.publish_date, b.author_id, a.name AS author_name
     FROM books b JOIN authors a ON a.id = b.author_id";

/// A book form that passed every check, ready to be written.
#[derive(Debug)]
struct ValidBook {
    title: String,
    publish_date: Option<NaiveDate>,
    author_id: i64,
}

async fn list_authors(db_pool: &DbPool) -> Result<Vec<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY name")
        .fetch_all(db_pool)
        .await
}

async fn find_book(db_pool: &DbPool, id: i64) -> Result<Option<BookWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, BookWithAuthor>(&format!("{BOOK_WITH_AUTHOR} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

/// Runs the declarative rules plus the ones that need parsing or the
/// author list, collecting every message rather than stopping at the first.
fn check_book_form(form: &BookForm, authors: &[Author]) -> Result<ValidBook, Vec<String>> {
    let mut messages = match form.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_messages(&errors),
    };

    let publish_date = parse_optional_date(&form.publish_date).unwrap_or_else(|_| {
        messages.push("Date Published must be formatted as YYYY-MM-DD.".to_string());
        None
    });

    let author_id = form
        .author_id
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| authors.iter().any(|a| a.id == *id));
    if author_id.is_none() {
        messages.push("Please choose an existing author.".to_string());
    }

    match author_id {
        Some(author_id) if messages.is_empty() => Ok(ValidBook {
            title: form.title.clone(),
            publish_date,
            author_id,
        }),
        _ => Err(messages),
    }
}

fn fields(form: &BookForm) -> BookFields<'_> {
    BookFields {
        title: &form.title,
        publish_date: &form.publish_date,
        author_id: &form.author_id,
    }
}

// --- Handlers ---

pub async fn home(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Html<String>, AppError> {
    tracing::debug!("Fetching all books");
    let books = sqlx::query_as::<_, BookWithAuthor>(&format!("{BOOK_WITH_AUTHOR} ORDER BY b.title"))
        .fetch_all(&state.db_pool)
        .await?;

    Ok(Html(pages::home(current.user(), &books)))
}

pub async fn book_detail(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let book = find_book(&state.db_pool, id).await?.ok_or(AppError::NotFound)?;
    let authors = list_authors(&state.db_pool).await?;

    Ok(Html(pages::book_detail(current.user(), &book, &authors, None, &[])))
}

/// POST /book/{id}
/// Updates a book; invalid input re-renders the detail page with messages.
pub async fn update_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let form = form.trimmed();
    let book = find_book(&state.db_pool, id).await?.ok_or(AppError::NotFound)?;
    let authors = list_authors(&state.db_pool).await?;

    let valid = match check_book_form(&form, &authors) {
        Ok(valid) => valid,
        Err(messages) => {
            let page = pages::book_detail(Some(&user), &book, &authors, Some(fields(&form)), &messages);
            return Ok(Html(page).into_response());
        }
    };

    tracing::info!("User {} updating book {}", user.username, id);
    sqlx::query("UPDATE books SET title = $1, publish_date = $2, author_id = $3 WHERE id = $4")
        .bind(&valid.title)
        .bind(valid.publish_date)
        .bind(valid.author_id)
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    Ok(pages::found(&format!("/book/{id}")))
}

pub async fn create_book_page(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Html<String>, AppError> {
    let authors = list_authors(&state.db_pool).await?;
    let form = BookForm::default();
    Ok(Html(pages::create_book(&user, &authors, fields(&form), &[])))
}

/// POST /create_book
pub async fn create_book(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let form = form.trimmed();
    let authors = list_authors(&state.db_pool).await?;

    let valid = match check_book_form(&form, &authors) {
        Ok(valid) => valid,
        Err(messages) => {
            let page = pages::create_book(&user, &authors, fields(&form), &messages);
            return Ok(Html(page).into_response());
        }
    };

    tracing::info!("User {} creating book: {}", user.username, valid.title);
    let book = sqlx::query_as::<_, Book>(
        "INSERT INTO books (title, publish_date, author_id) VALUES ($1, $2, $3)
         RETURNING id, title, publish_date, author_id",
    )
    .bind(&valid.title)
    .bind(valid.publish_date)
    .bind(valid.author_id)
    .fetch_one(&state.db_pool)
    .await?;

    tracing::debug!("Created book {:?}", book);
    Ok(pages::found(&format!("/book/{}", book.id)))
}

pub async fn create_author_page(user: AuthUser) -> Html<String> {
    Html(pages::create_author(&user, "", &[]))
}

/// POST /create_author
pub async fn create_author(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<AuthorForm>,
) -> Result<Response, AppError> {
    let form = form.trimmed();
    if let Err(errors) = form.validate() {
        let messages = validation_messages(&errors);
        return Ok(Html(pages::create_author(&user, &form.name, &messages)).into_response());
    }

    tracing::info!("User {} creating author: {}", user.username, form.name);
    sqlx::query("INSERT INTO authors (name) VALUES ($1)")
        .bind(&form.name)
        .execute(&state.db_pool)
        .await?;

    Ok(pages::found("/"))
}

pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(username): Path<String>,
) -> Result<Html<String>, AppError> {
    let profile = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = $1",
    )
    .bind(&username)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(Html(pages::profile(current.user(), &profile)))
}

/// Fallback for unknown routes, so they get the same 404 page as missing records.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
