//! Book model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::user::{non_blank, User, UserRef};

/// Internal row structure for the books table
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookRow {
    pub fn with_users(self, users: Vec<User>) -> Book {
        Book {
            id: self.id,
            name: self.name,
            desc: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            users,
        }
    }
}

/// Book with its associated users
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub desc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub users: Vec<User>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 128, message = "Book name is required"))]
    pub name: String,
    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    pub desc: Option<String>,
    /// Users to link to the book; at least one is required
    #[serde(default)]
    #[validate(length(min = 1, message = "missing parameter for users"))]
    pub users: Vec<UserRef>,
}

impl CreateBook {
    pub fn desc(&self) -> Option<&str> {
        non_blank(self.desc.as_deref())
    }
}

/// Update book request.
///
/// Blank or omitted fields leave the stored value unchanged. A non-empty
/// `users` list replaces the book's whole user set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(range(min = 1, message = "Book id is required"))]
    pub id: i64,
    #[validate(length(max = 128, message = "Book name must be at most 128 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    pub desc: Option<String>,
    #[serde(default)]
    pub users: Vec<UserRef>,
}

impl UpdateBook {
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    pub fn desc(&self) -> Option<&str> {
        non_blank(self.desc.as_deref())
    }

    /// Whether the request asks for the user set to be replaced
    pub fn replaces_users(&self) -> bool {
        !self.users.is_empty()
    }
}

/// Book list response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookList {
    pub books: Vec<Book>,
}
