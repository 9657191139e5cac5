use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    /// Stripe vocabulary; "none" when the user never subscribed.
    pub subscription_status: String,
    /// Remaining free itineraries; absent for subscribed users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_plans_remaining: Option<i32>,
}
