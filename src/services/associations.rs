//! Resolution of user references and maintenance of book/user links

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{book_user::BookUser, user::User, UserRef},
    repository::Repository,
};

/// What to do with a reference that matches no stored user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Drop it and keep going (book creation)
    Lenient,
    /// Abort the whole resolution with `UserNotFound` (book update)
    Strict,
}

#[derive(Clone)]
pub struct AssociationManager {
    repository: Repository,
}

impl AssociationManager {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve references to stored users, deduplicated by id in first-seen order
    pub async fn resolve(&self, references: &[UserRef], mode: Resolution) -> AppResult<Vec<User>> {
        let mut lookups = Vec::with_capacity(references.len());
        for reference in references {
            let found = self.repository.users.find_by_reference(reference).await?;
            if found.is_none() && mode == Resolution::Strict {
                return Err(unresolved(reference));
            }
            lookups.push((reference, found));
        }

        collect_resolved(lookups, mode)
    }

    /// Replace the book's user set with exactly `users`.
    ///
    /// Runs in the same transaction as the book's metadata overrides, so a
    /// failed replace leaves the book as it was.
    pub async fn replace(
        &self,
        book_id: i64,
        name: Option<&str>,
        desc: Option<&str>,
        users: &[User],
    ) -> AppResult<Vec<BookUser>> {
        let links = self
            .repository
            .books
            .update(book_id, name, desc, Some(users))
            .await?
            .unwrap_or_default();
        tracing::info!("Book {} now linked to {} user(s)", book_id, links.len());
        Ok(links)
    }
}

fn unresolved(reference: &UserRef) -> AppError {
    AppError::UserNotFound(format!("user does not exist: {}", reference))
}

/// Fold lookup results into the canonical user set.
///
/// The first user seen for a given id wins; later hits on the same id are skipped.
fn collect_resolved<'a, I>(lookups: I, mode: Resolution) -> AppResult<Vec<User>>
where
    I: IntoIterator<Item = (&'a UserRef, Option<User>)>,
{
    let mut seen = HashSet::new();
    let mut users = Vec::new();

    for (reference, found) in lookups {
        match found {
            Some(user) => {
                if seen.insert(user.id) {
                    users.push(user);
                }
            }
            None if mode == Resolution::Strict => return Err(unresolved(reference)),
            None => tracing::debug!("Dropping unresolved user reference {}", reference),
        }
    }

    Ok(users)
}
