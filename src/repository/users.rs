//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    credentials::CredentialHasher,
    error::{AppError, AppResult},
    models::user::{RegisterRequest, User, UserRef, UserRow},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Find the first user matching a reference by username OR id.
    ///
    /// Absent parts bind as NULL and never match.
    pub async fn find_by_reference(&self, reference: &UserRef) -> AppResult<Option<User>> {
        if reference.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT * FROM users
            WHERE username = $1 OR id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(reference.username())
        .bind(reference.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Find a user holding `token` who has logged in at least once.
    ///
    /// Callers must reject blank tokens before calling.
    pub async fn get_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT * FROM users
            WHERE token IS NOT NULL AND token = $1 AND created_at <> updated_at
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Create a new user, hashing the password before it is stored.
    ///
    /// `created_at` and `updated_at` start out identical.
    pub async fn create(&self, user: &RegisterRequest, hasher: &CredentialHasher) -> AppResult<User> {
        let password = hasher.hash(&user.password)?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password, mobile, email, gender, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&password)
        .bind(&user.mobile)
        .bind(&user.email)
        .bind(i16::from(user.gender))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)?;

        Ok(row.into())
    }

    /// Store a fresh session token.
    ///
    /// `updated_at` always moves strictly past `created_at`, which is what
    /// marks the user as having logged in.
    pub async fn set_token(&self, id: i64, token: &str) -> AppResult<User> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET token = $1,
                updated_at = GREATEST($2, created_at + INTERVAL '1 microsecond')
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        Ok(row.into())
    }
}
