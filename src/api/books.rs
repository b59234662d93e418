//! Book endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookList, CreateBook, UpdateBook},
    AppState,
};

use super::{AuthenticatedUser, MessageResponse};

/// Create a book
#[utoipa::path(
    post,
    path = "/api/v1/book",
    tag = "books",
    security(("token_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book created", body = Book),
        (status = 400, description = "Missing users or invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateBook>, AppError>,
) -> AppResult<Json<Book>> {
    request.validate()?;

    tracing::debug!("User {} (id {}) creating book '{}'", user.username, user.user_id, request.name);
    let book = state.services.books.create_book(&request).await?;
    Ok(Json(book))
}

/// List all books with their users
#[utoipa::path(
    get,
    path = "/api/v1/book",
    tag = "books",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "All books", body = BookList),
        (status = 403, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<BookList>> {
    let books = state.services.books.list_books().await?;
    Ok(Json(BookList { books }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/api/v1/book/{id}",
    tag = "books",
    security(("token_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid book ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_book(id).await?;
    Ok(Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/v1/book",
    tag = "books",
    security(("token_auth" = [])),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book or referenced user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<UpdateBook>, AppError>,
) -> AppResult<Json<Book>> {
    request.validate()?;

    tracing::debug!("User {} (id {}) updating book {}", user.username, user.user_id, request.id);
    let book = state.services.books.update_book(&request).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/v1/book/{id}",
    tag = "books",
    security(("token_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted (or did not exist)", body = MessageResponse),
        (status = 400, description = "Invalid book ID", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    tracing::debug!("User {} (id {}) deleting book {}", user.username, user.user_id, id);
    state.services.books.delete_book(id).await?;
    Ok(Json(MessageResponse::new("success")))
}
