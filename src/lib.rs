//! Bookshelf
//!
//! A multi-user book catalog server: users register and log in, and
//! authenticated users manage books linked to any number of users.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
