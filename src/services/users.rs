//! Registration, login and session-token authentication

use uuid::Uuid;

use crate::{
    credentials::CredentialHasher,
    error::{AppError, AppResult},
    models::user::{CurrentUser, LoginRequest, RegisterRequest, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    hasher: CredentialHasher,
}

impl UsersService {
    pub fn new(repository: Repository, hasher: CredentialHasher) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user. Does not log the user in.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Validation("Username already exists".to_string()));
        }

        let user = self.repository.users.create(request, &self.hasher).await?;
        tracing::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and issue a fresh session token
    pub async fn login(&self, request: &LoginRequest) -> AppResult<String> {
        let user = self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::UnknownLogin("user does not exist".to_string()))?;

        if !self.hasher.verify(&user.password, &request.password) {
            tracing::warn!("Failed login for user {}", user.username);
            return Err(AppError::InvalidCredentials("Password error".to_string()));
        }

        let token = Uuid::new_v4().to_string();
        let user = self.repository.users.set_token(user.id, &token).await?;

        tracing::info!("User {} logged in", user.username);
        Ok(token)
    }

    /// Resolve a presented session token to the user holding it.
    ///
    /// Blank tokens are rejected without touching the database, and a user
    /// who never logged in cannot authenticate whatever token is stored.
    pub async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        let token = token.trim();
        if token.is_empty() {
            return Err(authorization_failed());
        }

        let user = self
            .repository
            .users
            .get_by_token(token)
            .await?
            .filter(|u| u.has_logged_in() && u.token.as_deref() == Some(token))
            .ok_or_else(|| {
                tracing::debug!("Rejected unknown or stale token");
                authorization_failed()
            })?;

        Ok(CurrentUser {
            user_id: user.id,
            username: user.username,
        })
    }
}

fn authorization_failed() -> AppError {
    AppError::Authorization("Authorization failed".to_string())
}
