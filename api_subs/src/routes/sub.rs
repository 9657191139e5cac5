use actix_web::{Responder, get, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::jwt::JwtClaims;
use common::stripe;
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::sub::{CheckoutRequest, CheckoutResponse, PortalResponse, UserSubscriptionResponse};
use crate::services;

/// Creates a Stripe Checkout session for the Pro subscription.
///
/// # Input
/// - `claims`: JWT claims of the authenticated caller
/// - `req`: optional success/cancel redirect overrides
/// - `pool`, `config`: database pool and Stripe credentials
///
/// # Output
/// - Success: 201 with the hosted checkout URL to redirect the browser to
/// - Error: 500 when Stripe is not configured
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/sub/checkout', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   credentials: 'include',
///   body: JSON.stringify({})
/// });
///
/// if (response.ok) {
///   const data = await response.json();
///   window.location.href = data.url;
/// }
/// ```
#[post("/checkout")]
pub async fn post_checkout(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CheckoutRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    if config.stripe_secret_key.is_empty() || config.stripe_price_id.is_empty() {
        return Err(AppError::Internal("Stripe billing is not configured".to_string()));
    }

    let pg_pool: &PgPool = &**pool;
    let client = stripe::create_client(&config.stripe_secret_key);

    // reuse the stored customer, create one on first checkout
    let user = db::users::get_user_by_id(pg_pool, claims.user_id).await?;
    let customer_id = match user.stripe_customer_id {
        Some(id) => id,
        None => {
            let customer = stripe::create_customer(&client, user.id, &user.email).await?;
            db::users::set_stripe_customer_id(pg_pool, user.id, customer.id.as_str()).await?;
            customer.id.to_string()
        }
    };

    let success_url = req
        .success_url
        .clone()
        .unwrap_or_else(|| format!("{}/pricing?checkout=success", config.site_url));
    let cancel_url = req
        .cancel_url
        .clone()
        .unwrap_or_else(|| format!("{}/pricing?checkout=canceled", config.site_url));

    let session = services::pay::create_checkout_session(
        &client,
        &customer_id,
        &config.stripe_price_id,
        &success_url,
        &cancel_url,
    )
    .await?;

    Success::created(CheckoutResponse {
        url: session.url.unwrap_or_default(),
    })
}

/// Opens a Stripe billing-portal session for the caller.
///
/// # Output
/// - Success: the portal URL to redirect the browser to
/// - Error: 404 when the user has never gone through checkout
#[post("/portal")]
pub async fn post_portal(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    if config.stripe_secret_key.is_empty() {
        return Err(AppError::Internal("Stripe billing is not configured".to_string()));
    }

    let pg_pool: &PgPool = &**pool;
    let user = db::users::get_user_by_id(pg_pool, claims.user_id).await?;
    let customer_id = user
        .stripe_customer_id
        .ok_or_else(|| AppError::NotFound("No subscription found".to_string()))?;

    let client = stripe::create_client(&config.stripe_secret_key);
    let return_url = format!("{}/pricing", config.site_url);
    let session = services::pay::create_portal_session(&client, &customer_id, &return_url).await?;

    Success::ok(PortalResponse { url: session.url })
}

/// Retrieves the caller's current subscription record.
///
/// # Output
/// - Success: the stored subscription row
/// - Error: 404 when the user has no subscription
#[get("/current")]
pub async fn get_current(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let subscription = db::subscriptions::get_for_user(pg_pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found".to_string()))?;

    Success::ok(UserSubscriptionResponse { subscription })
}
