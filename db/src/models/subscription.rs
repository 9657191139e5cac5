use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entitlement source of truth. `status` uses Stripe's vocabulary
/// ("active", "canceled", "past_due", ...); only "active" entitles the user
/// to unlimited itinerary generation.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub status: String,
    pub current_period_end: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

pub const STATUS_ACTIVE: &str = "active";
