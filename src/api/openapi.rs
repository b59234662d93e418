//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Multi-user book catalog REST API"
    ),
    paths(
        // Auth
        auth::register,
        auth::login,
        // Health
        health::health_check,
        health::readiness_check,
        health::liveness,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::UserRef,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookList,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Common
            crate::api::MessageResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&TokenAuth),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Book catalog management"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Declares the raw `Authorization` header token scheme
struct TokenAuth;

impl Modify for TokenAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
