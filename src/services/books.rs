//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

use super::associations::{AssociationManager, Resolution};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    associations: AssociationManager,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self {
            associations: AssociationManager::new(repository.clone()),
            repository,
        }
    }

    /// List every book with its users
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book with its users
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| book_not_found(id))
    }

    /// Create a book linked to whichever of the referenced users exist
    pub async fn create_book(&self, request: &CreateBook) -> AppResult<Book> {
        if request.users.is_empty() {
            return Err(AppError::Validation("missing parameter for users".to_string()));
        }

        let users = self
            .associations
            .resolve(&request.users, Resolution::Lenient)
            .await?;

        if users.len() < request.users.len() {
            tracing::info!(
                "Creating book '{}': {} of {} user reference(s) resolved",
                request.name,
                users.len(),
                request.users.len()
            );
        }

        let book = self
            .repository
            .books
            .create(&request.name, request.desc(), &users)
            .await?;

        tracing::info!("Created book {} (id {})", book.name, book.id);
        Ok(book)
    }

    /// Apply non-blank field overrides and, if users are given, replace the user set.
    ///
    /// All references are resolved before anything is written, so an unknown
    /// user leaves the book untouched.
    pub async fn update_book(&self, request: &UpdateBook) -> AppResult<Book> {
        let id = request.id;
        self.get_book(id).await?;

        if request.replaces_users() {
            let users = self
                .associations
                .resolve(&request.users, Resolution::Strict)
                .await?;
            self.associations
                .replace(id, request.name(), request.desc(), &users)
                .await?;
        } else {
            self.repository
                .books
                .update(id, request.name(), request.desc(), None)
                .await?;
        }

        tracing::info!("Updated book {}", id);
        self.get_book(id).await
    }

    /// Delete a book and its links. Unknown ids are a no-op.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        if self.repository.books.delete(id).await? {
            tracing::info!("Deleted book {}", id);
        } else {
            tracing::debug!("Delete of unknown book {} ignored", id);
        }
        Ok(())
    }
}

fn book_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}
