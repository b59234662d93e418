//! Business logic services

pub mod associations;
pub mod books;
pub mod users;

use crate::{config::AuthConfig, credentials::CredentialHasher, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), CredentialHasher::new(auth_config)),
            books: books::BooksService::new(repository.clone()),
            repository,
        }
    }
}
