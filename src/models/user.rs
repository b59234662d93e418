//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Gender flag (0 = male, 1 = female)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "i16", into = "i16")]
#[repr(i16)]
pub enum Gender {
    #[default]
    Male = 0,
    Female = 1,
}

impl From<i16> for Gender {
    fn from(v: i16) -> Self {
        match v {
            1 => Gender::Female,
            _ => Gender::Male,
        }
    }
}

impl From<Gender> for i16 {
    fn from(g: Gender) -> Self {
        g as i16
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub gender: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub token: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password: row.password,
            mobile: row.mobile,
            email: row.email,
            gender: Gender::from(row.gender),
            created_at: row.created_at,
            updated_at: row.updated_at,
            token: row.token,
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = i16)]
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Current session token, set at login
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl User {
    /// A user who never logged in still has identical creation and update timestamps.
    pub fn has_logged_in(&self) -> bool {
        self.created_at != self.updated_at
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 128, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 32, message = "Mobile must be at most 32 characters"))]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        email(message = "Invalid email format"),
        length(max = 128, message = "Email must be at most 128 characters")
    )]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(value_type = i16)]
    pub gender: Gender,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response carrying the fresh session token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Identity resolved by the auth gate for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
}

/// Caller-supplied reference to an existing user, by username and/or id
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UserRef {
    pub username: Option<String>,
    #[serde(alias = "uid")]
    pub id: Option<i64>,
}

impl UserRef {
    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    /// Zero is never a stored id, so it counts as absent
    pub fn id(&self) -> Option<i64> {
        self.id.filter(|id| *id > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.username().is_none() && self.id().is_none()
    }
}

impl std::fmt::Display for UserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.username(), self.id()) {
            (Some(name), Some(id)) => write!(f, "{} (id {})", name, id),
            (Some(name), None) => write!(f, "{}", name),
            (None, Some(id)) => write!(f, "id {}", id),
            (None, None) => write!(f, "<empty reference>"),
        }
    }
}

/// Optional contact fields: blank values are stored as NULL
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
