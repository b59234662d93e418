//! Book-User junction model (N:M relationship)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::user::{User, UserRow};

/// Junction row linking a book to a user; unique per (book_id, user_id)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookUser {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
}

/// A user row joined through `book_users`, tagged with the book it belongs to
#[derive(Debug, Clone, FromRow)]
pub struct LinkedUserRow {
    pub book_id: i64,
    #[sqlx(flatten)]
    pub user: UserRow,
}

impl LinkedUserRow {
    pub fn into_parts(self) -> (i64, User) {
        (self.book_id, User::from(self.user))
    }
}
