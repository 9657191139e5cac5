use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::stripe;
use sqlx::PgPool;

use crate::services;

/// Handles Stripe webhook events for subscription lifecycle changes.
///
/// # Input
/// - `payload`: Raw string containing the webhook event data
/// - `req`: HTTP request containing Stripe signature in headers
/// - `pool`, `config`: database pool and webhook secret
///
/// # Output
/// - Success: Returns 200 OK when webhook is processed successfully
/// - Error: Returns 400 Bad Request for invalid signature or 500 for processing errors
///
/// # Note
/// This endpoint is not called directly from your frontend application.
/// It's called by Stripe's servers when events occur. Configure the URL in
/// your Stripe Dashboard under Webhooks and set the signing secret as
/// STRIPE_WEBHOOK_SECRET.
///
/// # Example Event Types Handled
/// - customer.subscription.created: subscription row upserted
/// - customer.subscription.updated: subscription row upserted
/// - customer.subscription.deleted: subscription marked canceled
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: actix_web::HttpRequest,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    if config.stripe_webhook_secret.is_empty() {
        return Err(AppError::BadRequest("Webhook not configured".to_string()));
    }

    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event =
        services::pay::construct_event(&payload, signature, &config.stripe_webhook_secret)?;

    let client = stripe::create_client(&config.stripe_secret_key);
    services::sub::process_webhook_event(&**pool, &client, event).await?;

    Success::ok("Webhook processed successfully")
}
