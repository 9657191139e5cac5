use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::user::UserCreateRequest,
    models::user::{AuthCredentials, User},
};

pub async fn exists_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, first_name, last_name, stripe_customer_id, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_user_by_stripe_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_customer_id: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, first_name, last_name, stripe_customer_id, created_at, updated_at
         FROM users WHERE stripe_customer_id = $1",
    )
    .bind(stripe_customer_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &UserCreateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, first_name, last_name)
        VALUES ($1, $2, $3)
        RETURNING id, email, first_name, last_name, stripe_customer_id, created_at, updated_at
        "#,
    )
    .bind(&data.email)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_user_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &AuthCredentials,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_credentials (user_id, password_hash)
        VALUES ($1, $2)
        "#,
    )
    .bind(data.user_id)
    .bind(&data.password_hash)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn set_stripe_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    stripe_customer_id: &str,
) -> Res<()> {
    sqlx::query(
        "UPDATE users SET stripe_customer_id = $2, updated_at = now() WHERE id = $1",
    )
    .bind(user_id)
    .bind(stripe_customer_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_user_with_password_hash<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<Option<(User, AuthCredentials)>> {
    #[derive(sqlx::FromRow)]
    struct UserWithHash {
        #[sqlx(flatten)]
        user: User,
        password_hash: String,
    }

    let row = sqlx::query_as::<_, UserWithHash>(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name, u.stripe_customer_id,
               u.created_at, u.updated_at, ac.password_hash
        FROM users u
        JOIN auth_credentials ac ON u.id = ac.user_id
        WHERE u.email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)?;

    Ok(row.map(|r| {
        let credentials = AuthCredentials {
            user_id: r.user.id,
            password_hash: r.password_hash,
        };
        (r.user, credentials)
    }))
}
