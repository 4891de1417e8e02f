//! Server-rendered HTML.
//!
//! Every page goes through [`layout`], which renders the navigation bar: "Log Out"
//! and the author/book links for a signed-in user, "Log In" and "Sign Up" otherwise.
//! All dynamic text is passed through [`escape`] before it reaches the markup.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use common::{Author, BookWithAuthor, User};

use crate::extractors::AuthUser;

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn encode_query(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// A plain `302 Found` redirect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn style() -> &'static str {
    r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f5f1; color: #222; }
nav { background: #2f3e46; padding: 12px 24px; }
nav a { color: #fff; margin-right: 16px; text-decoration: none; }
main { max-width: 720px; margin: 24px auto; padding: 0 16px; }
.card { background: #fff; border-radius: 8px; padding: 20px; margin-bottom: 16px; }
.error { color: #b00020; margin: 8px 0; }
label { display: block; margin-top: 12px; }
input, select { padding: 6px; width: 100%; box-sizing: border-box; }
button { margin-top: 16px; padding: 8px 16px; }
"#
}

fn nav(user: Option<&AuthUser>) -> String {
    match user {
        Some(user) => format!(
            r#"<a href="/">Home</a>
  <a href="/create_book">Create Book</a>
  <a href="/create_author">Create Author</a>
  <a href="/profile/{username_q}">{username}</a>
  <a href="/logout">Log Out</a>"#,
            username_q = escape(&encode_query(&user.username)),
            username = escape(&user.username),
        ),
        None => r#"<a href="/">Home</a>
  <a href="/signup">Sign Up</a>
  <a href="/login">Log In</a>"#
            .to_string(),
    }
}

fn layout(title: &str, user: Option<&AuthUser>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} - Books</title>
<style>{style}</style>
</head><body>
<nav>
  {nav}
</nav>
<main>
{body}
</main>
</body></html>"#,
        title = escape(title),
        style = style(),
        nav = nav(user),
    )
}

fn errors_html(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .collect()
}

fn author_options(authors: &[Author], selected: &str) -> String {
    authors
        .iter()
        .map(|a| {
            let id = a.id.to_string();
            let selected = if id == selected { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{name}</option>"#,
                name = escape(&a.name)
            )
        })
        .collect()
}

fn book_fields(title: &str, publish_date: &str, author_id: &str, authors: &[Author]) -> String {
    format!(
        r#"<label>Title <input type="text" name="title" value="{title}" required></label>
    <label>Date Published <input type="date" name="publish_date" value="{publish_date}"></label>
    <label>Author <select name="author_id">{options}</select></label>"#,
        title = escape(title),
        publish_date = escape(publish_date),
        options = author_options(authors, author_id),
    )
}

pub fn home(user: Option<&AuthUser>, books: &[BookWithAuthor]) -> String {
    let list: String = if books.is_empty() {
        "<p>No books yet.</p>".to_string()
    } else {
        let items: String = books
            .iter()
            .map(|b| {
                format!(
                    r#"<li><a href="/book/{id}">{title}</a> by {author}</li>"#,
                    id = b.id,
                    title = escape(&b.title),
                    author = escape(&b.author_name),
                )
            })
            .collect();
        format!("<ul>{items}</ul>")
    };

    let body = format!(r#"<div class="card"><h1>All Books</h1>{list}</div>"#);
    layout("Home", user, &body)
}

pub fn signup(user: Option<&AuthUser>, username: &str, errors: &[String]) -> String {
    let body = format!(
        r#"<div class="card">
  <h1>Sign Up</h1>
  {errors}
  <form method="POST" action="/signup">
    <label>Username <input type="text" name="username" value="{username}" required autocomplete="username"></label>
    <label>Password <input type="password" name="password" required autocomplete="new-password"></label>
    <button type="submit">Sign Up</button>
  </form>
  <p>Already have an account? <a href="/login">Log in here</a>.</p>
</div>"#,
        errors = errors_html(errors),
        username = escape(username),
    );
    layout("Sign Up", user, &body)
}

pub fn login(
    user: Option<&AuthUser>,
    username: &str,
    next: Option<&str>,
    errors: &[String],
) -> String {
    let action = match next {
        Some(next) => format!("/login?next={}", encode_query(next)),
        None => "/login".to_string(),
    };
    let body = format!(
        r#"<div class="card">
  <h1>Log In</h1>
  {errors}
  <form method="POST" action="{action}">
    <label>Username <input type="text" name="username" value="{username}" required autocomplete="username"></label>
    <label>Password <input type="password" name="password" required autocomplete="current-password"></label>
    <button type="submit">Log In</button>
  </form>
  <p>No account yet? <a href="/signup">Sign up here</a>.</p>
</div>"#,
        errors = errors_html(errors),
        action = escape(&action),
        username = escape(username),
    );
    layout("Log In", user, &body)
}

/// Field values to prefill an edit form with, as the user last typed them.
pub struct BookFields<'a> {
    pub title: &'a str,
    pub publish_date: &'a str,
    pub author_id: &'a str,
}

pub fn book_detail(
    user: Option<&AuthUser>,
    book: &BookWithAuthor,
    authors: &[Author],
    fields: Option<BookFields<'_>>,
    errors: &[String],
) -> String {
    let published = book
        .publish_date
        .map(|d| format!("<p>Published {}</p>", d.format("%B %-d, %Y")))
        .unwrap_or_default();

    let edit = match user {
        Some(_) => {
            let stored_date = book
                .publish_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let stored_author = book.author_id.to_string();
            let fields = fields.unwrap_or(BookFields {
                title: &book.title,
                publish_date: &stored_date,
                author_id: &stored_author,
            });
            format!(
                r#"<div class="card">
  <h2>Edit Book</h2>
  {errors}
  <form method="POST" action="/book/{id}">
    {fields}
    <button type="submit">Save</button>
  </form>
</div>"#,
                errors = errors_html(errors),
                id = book.id,
                fields = book_fields(fields.title, fields.publish_date, fields.author_id, authors),
            )
        }
        None => String::new(),
    };

    let body = format!(
        r#"<div class="card">
  <h1>{title}</h1>
  <p>Written by {author}</p>
  {published}
</div>
{edit}"#,
        title = escape(&book.title),
        author = escape(&book.author_name),
    );
    layout(&book.title, user, &body)
}

pub fn create_book(
    user: &AuthUser,
    authors: &[Author],
    fields: BookFields<'_>,
    errors: &[String],
) -> String {
    let body = format!(
        r#"<div class="card">
  <h1>Create Book</h1>
  {errors}
  <form method="POST" action="/create_book">
    {fields}
    <button type="submit">Create</button>
  </form>
</div>"#,
        errors = errors_html(errors),
        fields = book_fields(fields.title, fields.publish_date, fields.author_id, authors),
    );
    layout("Create Book", Some(user), &body)
}

pub fn create_author(user: &AuthUser, name: &str, errors: &[String]) -> String {
    let body = format!(
        r#"<div class="card">
  <h1>Create Author</h1>
  {errors}
  <form method="POST" action="/create_author">
    <label>Name <input type="text" name="name" value="{name}" required></label>
    <button type="submit">Create</button>
  </form>
</div>"#,
        errors = errors_html(errors),
        name = escape(name),
    );
    layout("Create Author", Some(user), &body)
}

pub fn profile(user: Option<&AuthUser>, profile: &User) -> String {
    let body = format!(
        r#"<div class="card"><h1>{username}</h1><p>Member #{id}</p></div>"#,
        username = escape(&profile.username),
        id = profile.id,
    );
    layout(&profile.username, user, &body)
}

pub fn error_page(status: StatusCode, message: &str, user: Option<&AuthUser>) -> String {
    let body = format!(
        r#"<div class="card"><h1>{code}</h1><p>{message}</p></div>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    layout(status.canonical_reason().unwrap_or("Error"), user, &body)
}
