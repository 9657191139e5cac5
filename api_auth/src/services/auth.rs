use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;

use crate::dtos::auth::LoginRequest;

/// Authenticates existing user.
/// If user does not exist, returns 400
/// If password does not match the stored hash, returns 401
///
/// # Arguments
///
/// * `pool` - A reference to the database connection pool.
/// * `login_data` - The login data.
///
/// # Returns
///
/// A `Result` containing the `User` object or an `AppError` if an error occurs.
pub async fn authenticate_user(pool: &PgPool, login_data: &LoginRequest) -> Res<User> {
    let (user, credentials) = db::users::get_user_with_password_hash(pool, &login_data.email)
        .await?
        .ok_or_else(|| AppError::BadRequest("User with this email does not exist".to_string()))?;

    let parsed_hash = PasswordHash::new(&credentials.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    let is_valid = Argon2::default()
        .verify_password(login_data.password.as_bytes(), &parsed_hash)
        .is_ok();

    if is_valid {
        Ok(user)
    } else {
        Err(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}
