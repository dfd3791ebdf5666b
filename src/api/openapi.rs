//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler, google_handler, user_handler};
use crate::domain::{UserResponse, UserRole};
use crate::types::{AuthResponse, PaginationMeta, UserData};

/// OpenAPI documentation for the ROBOT Cleaner API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ROBOT Cleaner API",
        version = "0.1.0",
        description = "Accounts and authentication for the ROBOT Cleaner storefront",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5002", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::forgot_password,
        auth_handler::reset_password,
        google_handler::google_redirect,
        google_handler::google_callback,
        // Account endpoints
        account_handler::me,
        account_handler::validate,
        account_handler::logout,
        account_handler::update_profile,
        account_handler::change_password,
        account_handler::delete_account,
        // User endpoints
        user_handler::list_users,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            UserData,
            AuthResponse,
            PaginationMeta,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetPasswordRequest,
            account_handler::UpdateProfileRequest,
            account_handler::ChangePasswordRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password recovery"),
        (name = "Account", description = "The signed-in user's own account"),
        (name = "Users", description = "Admin user management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT from /api/auth/login; the `jwt` cookie is accepted too",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_auth_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/google/callback",
            "/api/auth/reset-password/{token}",
            "/api/users",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
