use actix_web::{Responder, get, web};
use common::env_config::Config;
use common::error::Res;
use common::http::Success;
use common::jwt::JwtClaims;
use db::models::subscription::STATUS_ACTIVE;
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::auth::MeResponse;

/// Returns the authenticated user's profile together with their
/// subscription status and, for free-tier users, how many free itineraries
/// they still have.
#[get("/me")]
pub async fn get_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user = db::users::get_user_by_id(pg_pool, claims.user_id).await?;

    let subscription_status = db::subscriptions::get_for_user(pg_pool, claims.user_id)
        .await?
        .map(|s| s.status)
        .unwrap_or_else(|| "none".to_string());

    let free_plans_remaining = if subscription_status == STATUS_ACTIVE {
        None
    } else {
        let used = db::usage::get_usage(pg_pool, claims.user_id).await?;
        Some((config.free_plan_quota - used).max(0))
    };

    Success::ok(MeResponse {
        user,
        subscription_status,
        free_plans_remaining,
    })
}
