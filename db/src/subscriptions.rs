use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::SubscriptionUpsert,
    models::subscription::{STATUS_ACTIVE, Subscription},
};

pub async fn get_for_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        "SELECT user_id, stripe_customer_id, stripe_subscription_id, status,
                current_period_end, updated_at
         FROM subscriptions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Whether the user currently holds an entitling subscription.
pub async fn is_active<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND status = $2)",
    )
    .bind(user_id)
    .bind(STATUS_ACTIVE)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn upsert<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &SubscriptionUpsert,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (user_id, stripe_customer_id, stripe_subscription_id, status, current_period_end)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            stripe_customer_id = EXCLUDED.stripe_customer_id,
            stripe_subscription_id = EXCLUDED.stripe_subscription_id,
            status = EXCLUDED.status,
            current_period_end = EXCLUDED.current_period_end,
            updated_at = now()
        "#,
    )
    .bind(data.user_id)
    .bind(&data.stripe_customer_id)
    .bind(&data.stripe_subscription_id)
    .bind(&data.status)
    .bind(data.current_period_end)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn mark_canceled<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
) -> Res<()> {
    sqlx::query(
        "UPDATE subscriptions SET status = 'canceled', updated_at = now()
         WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .execute(executor)
    .await?;
    Ok(())
}
