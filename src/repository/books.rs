//! Books repository, including the book_users junction

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookRow},
        book_user::{BookUser, LinkedUserRow},
        user::User,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// List all books with their users
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|b| b.id).collect();
        let mut users = self.get_users_for_books(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let linked = users.remove(&row.id).unwrap_or_default();
                row.with_users(linked)
            })
            .collect())
    }

    /// Get a book by ID with its users
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let Some(row) = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut users = self.get_users_for_books(&[id]).await?;
        Ok(Some(row.with_users(users.remove(&id).unwrap_or_default())))
    }

    /// Load linked users for a set of books, in link insertion order
    async fn get_users_for_books(&self, book_ids: &[i64]) -> AppResult<HashMap<i64, Vec<User>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LinkedUserRow>(
            r#"
            SELECT bu.book_id, u.*
            FROM book_users bu
            JOIN users u ON u.id = bu.user_id
            WHERE bu.book_id = ANY($1)
            ORDER BY bu.book_id, bu.id
            "#,
        )
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<User>> = HashMap::new();
        for row in rows {
            let (book_id, user) = row.into_parts();
            grouped.entry(book_id).or_default().push(user);
        }
        Ok(grouped)
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Insert a book and link it to `users` in one transaction
    pub async fn create(&self, name: &str, desc: Option<&str>, users: &[User]) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(desc)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_db)?;

        let links = insert_links(&mut tx, row.id, users).await?;
        tx.commit().await?;

        tracing::debug!("Book {} linked to {} user(s)", row.id, links.len());
        Ok(row.with_users(users.to_vec()))
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Apply metadata overrides (`None` keeps the stored value) and, when
    /// `users` is given, make the book's user set exactly `users`.
    ///
    /// Both steps commit together. Returns the fresh links, or `None` when the
    /// user set was left alone.
    pub async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        desc: Option<&str>,
        users: Option<&[User]>,
    ) -> AppResult<Option<Vec<BookUser>>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE books SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(name)
        .bind(desc)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from_db)?;

        let links = match users {
            Some(users) => Some(replace_links(&mut tx, id, users).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(links)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book and its links. Returns false when no such book existed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_users WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
// BOOK_USERS (junction)
// =========================================================================

/// Delete every link of the book, then insert one link per user.
///
/// The book row is locked first so concurrent replaces on the same book run one after the other.
async fn replace_links(
    conn: &mut PgConnection,
    book_id: i64,
    users: &[User],
) -> AppResult<Vec<BookUser>> {
    sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM book_users WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    insert_links(conn, book_id, users).await
}

async fn insert_links(
    conn: &mut PgConnection,
    book_id: i64,
    users: &[User],
) -> AppResult<Vec<BookUser>> {
    let mut links = Vec::with_capacity(users.len());

    for user in users {
        let link = sqlx::query_as::<_, BookUser>(
            r#"
            INSERT INTO book_users (book_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (book_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::from_db)?;

        links.extend(link);
    }

    Ok(links)
}
