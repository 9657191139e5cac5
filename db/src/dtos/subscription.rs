use chrono::NaiveDateTime;
use uuid::Uuid;

/// Subscription state as extracted from a Stripe webhook event.
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub status: String,
    pub current_period_end: Option<NaiveDateTime>,
}
