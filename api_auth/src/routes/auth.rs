use actix_session::Session;
use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::jwt::{self, ClaimsSpec};
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services;

/// Registers a new user with email and password authentication.
///
/// # Input
/// - `req`: JSON payload containing registration information (email, password, names)
/// - `pool`: Database connection pool
/// - `config`: Application configuration
/// - `session`: Cookie session; the fresh token is stored so the browser is
///   signed in immediately after registration
///
/// # Output
/// - Success: Returns the token and created user with 201 Created status
/// - Error: Returns 400 Bad Request if the email already exists
///
/// # Frontend Example
/// ```javascript
/// // Using fetch API
/// const response = await fetch('/api/auth/register', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json'
///   },
///   body: JSON.stringify({
///     email: 'user@example.com',
///     password: 'securepassword',
///     first_name: 'Hana',
///     last_name: 'Sato'
///   })
/// });
///
/// if (response.ok) {
///   const authData = await response.json();
///   console.log('Registered user:', authData.user);
/// }
/// ```
#[post("/register")]
pub async fn post_register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    session: Session,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let email_exists = db::users::exists_user_by_email(pg_pool, &req.email).await?;
    if email_exists {
        return Err(AppError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let user = services::user::create_user_with_credentials(pg_pool, &req.into_inner()).await?;
    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            email: user.email.clone(),
            stripe_customer_id: user.stripe_customer_id.clone(),
        },
        &config.jwt_config,
    )?;

    session
        .insert("token", &token)
        .map_err(|_| AppError::Internal("Failed to insert token cookie".to_string()))?;

    Success::created(AuthResponse { token, user })
}

/// Authenticates a user with email and password.
///
/// # Input
/// - `login_data`: JSON payload containing email and password
/// - `config`: Application configuration for JWT generation
/// - `pool`: Database connection pool
/// - `session`: Cookie session receiving the issued token
///
/// # Output
/// - Success: Returns an auth response with JWT token and user details
/// - Error: Returns 401 Unauthorized for invalid credentials
///
/// # Frontend Example
/// ```javascript
/// // Using fetch API
/// const response = await fetch('/api/auth/login', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json'
///   },
///   body: JSON.stringify({
///     email: 'user@example.com',
///     password: 'securepassword'
///   })
/// });
///
/// if (response.ok) {
///   const authData = await response.json();
///   console.log('Logged in user:', authData.user);
/// }
/// ```
#[post("/login")]
pub async fn post_login(
    login_data: web::Json<LoginRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    session: Session,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user = services::auth::authenticate_user(pg_pool, &login_data.into_inner()).await?;
    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            email: user.email.clone(),
            stripe_customer_id: user.stripe_customer_id.clone(),
        },
        &config.jwt_config,
    )?;

    session
        .insert("token", &token)
        .map_err(|_| AppError::Internal("Failed to insert token cookie".to_string()))?;

    Success::ok(AuthResponse { token, user })
}

/// Ends the caller's session.
#[post("/logout")]
pub async fn post_logout(session: Session) -> Res<impl Responder> {
    session.purge();
    Success::ok(serde_json::json!({ "logged_out": true }))
}
