//! Data models for Bookshelf

pub mod book;
pub mod book_user;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookList, CreateBook, UpdateBook};
pub use book_user::BookUser;
pub use user::{CurrentUser, User, UserRef};
