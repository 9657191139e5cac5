use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}
pub mod routes {
    pub mod auth;
    pub mod user;
}
mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}
mod dtos {
    pub(crate) mod auth;
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::post_register)
        .service(routes::auth::post_login)
        .service(routes::auth::post_logout)
}

pub fn mount_user() -> actix_web::Scope {
    web::scope("/user").service(routes::user::get_me)
}

/// Guard for scopes that require an authenticated caller.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}

/// Cookie session layer carrying the JWT between requests. The JWT secret
/// doubles as cookie-signing key material and must be at least 32 bytes.
pub fn session_middleware(
    cookie_secure: bool,
    secret: &[u8],
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::derive_from(secret))
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .build()
}
