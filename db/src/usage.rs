use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

/// Current free-tier usage count for the user. Missing row reads as zero.
pub async fn get_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<i32> {
    let used = sqlx::query_scalar::<_, i32>("SELECT used FROM plan_usage WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)?;
    Ok(used.unwrap_or(0))
}

/// Claims one free-tier generation for the user, atomically.
///
/// Check-and-increment happens in a single statement so two concurrent
/// requests from the same user cannot both pass a separate read-then-write
/// quota check. Returns `false` when the cap is already reached; the counter
/// is left untouched in that case.
pub async fn claim_free_generation<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    cap: i32,
) -> Res<bool> {
    if cap <= 0 {
        return Ok(false);
    }

    let claimed = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO plan_usage (user_id, used)
        VALUES ($1, 1)
        ON CONFLICT (user_id) DO UPDATE
            SET used = plan_usage.used + 1, updated_at = now()
            WHERE plan_usage.used < $2
        RETURNING used
        "#,
    )
    .bind(user_id)
    .bind(cap)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)?;

    Ok(claimed.is_some())
}

/// Returns a previously claimed unit after a failed generation so the
/// failure does not consume the user's free plan. Never goes below zero.
pub async fn release_free_generation<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query(
        "UPDATE plan_usage SET used = GREATEST(used - 1, 0), updated_at = now()
         WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}
