use db::models::subscription::Subscription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Overrides for the post-checkout redirects; defaults derive from
    /// `SITE_URL`.
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UserSubscriptionResponse {
    pub subscription: Subscription,
}
