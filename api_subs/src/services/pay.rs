use common::error::{AppError, Res};
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client, CreateBillingPortalSession,
    CreateCheckoutSession, CustomerId, Event, Webhook,
};

/// Creates a subscription checkout session for a given customer.
pub async fn create_checkout_session(
    client: &Client,
    customer_id: &str,
    price_id: &str,
    success_url: &str,
    cancel_url: &str,
) -> Res<CheckoutSession> {
    let customer_id = customer_id
        .parse::<CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid customer ID: {}", e)))?;

    let params = CreateCheckoutSession {
        payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(success_url),
        cancel_url: Some(cancel_url),
        customer: Some(customer_id),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates a billing-portal session so subscribers can manage or cancel
/// their plan on Stripe's hosted pages.
pub async fn create_portal_session(
    client: &Client,
    customer_id: &str,
    return_url: &str,
) -> Res<BillingPortalSession> {
    let customer_id = customer_id
        .parse::<CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid customer ID: {}", e)))?;

    let mut params = CreateBillingPortalSession::new(customer_id);
    params.return_url = Some(return_url);

    BillingPortalSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}
