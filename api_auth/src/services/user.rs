use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use common::error::{AppError, Res};
use db::{
    dtos::user::UserCreateRequest,
    models::user::{AuthCredentials, User},
};
use sqlx::PgPool;

use crate::dtos::auth::RegisterRequest;

/// Creates a user together with their password credentials in one
/// transaction, so a failed credential insert never leaves a user without a
/// way to log in.
pub async fn create_user_with_credentials(pool: &PgPool, req: &RegisterRequest) -> Res<User> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let user = db::users::insert_user(
        &mut *tx,
        &UserCreateRequest {
            email: req.email.clone(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
        },
    )
    .await?;

    db::users::insert_user_credentials(
        &mut *tx,
        &AuthCredentials {
            user_id: user.id,
            password_hash,
        },
    )
    .await?;

    tx.commit().await.map_err(AppError::from)?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"hanamichi", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"hanamichi", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong-password", &parsed)
                .is_err()
        );
    }
}
