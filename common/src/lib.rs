use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub mod utils;

// --- Rows ---

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub publish_date: Option<NaiveDate>,
    pub author_id: i64,
}

/// A book joined with its author's name, as listed on the home page.
#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BookWithAuthor {
    pub id: i64,
    pub title: String,
    pub publish_date: Option<NaiveDate>,
    pub author_id: i64,
    pub author_name: String,
}

// --- Form payloads ---

/// Username and password, as posted by both the signup and login forms.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default)]
pub struct BookForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 80, message = "Title must be between 3 and 80 characters."))]
    pub title: String,
    /// `YYYY-MM-DD`, or empty when the date is unknown.
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub author_id: String,
}

impl BookForm {
    /// Strips surrounding whitespace so length rules apply to what gets stored.
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            publish_date: self.publish_date.trim().to_string(),
            author_id: self.author_id.trim().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 80, message = "Name must be between 3 and 80 characters."))]
    pub name: String,
}

impl AuthorForm {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}
