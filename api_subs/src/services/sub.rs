use chrono::DateTime;
use common::error::{AppError, Res};
use sqlx::PgPool;
use stripe::{Client, Customer, Event, EventObject, EventType, Expandable, Subscription};
use uuid::Uuid;

use db::dtos::subscription::SubscriptionUpsert;

/// Applies a Stripe webhook event to the subscriptions table.
///
/// The webhook flow is the sole writer of subscription state; everything
/// else in the application only reads it.
pub async fn process_webhook_event(pool: &PgPool, client: &Client, event: Event) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match event.type_ {
        EventType::CustomerSubscriptionCreated | EventType::CustomerSubscriptionUpdated => {
            if let EventObject::Subscription(subscription) = event.data.object {
                sync_subscription(pool, client, &subscription).await?;
            }
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                log::info!("Subscription deleted: {}", subscription.id);
                db::subscriptions::mark_canceled(pool, subscription.id.as_str()).await?;
            }
        }
        _ => {
            log::info!("Unhandled event type: {}", event.type_);
        }
    }

    Ok(())
}

/// Upserts the user's subscription row from a Stripe subscription object.
async fn sync_subscription(pool: &PgPool, client: &Client, subscription: &Subscription) -> Res<()> {
    let customer_id = match &subscription.customer {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(customer) => customer.id.to_string(),
    };

    let user_id = resolve_user_id(pool, client, &customer_id).await?;

    let current_period_end = DateTime::from_timestamp(subscription.current_period_end, 0)
        .map(|dt| dt.naive_utc());

    db::subscriptions::upsert(
        pool,
        &SubscriptionUpsert {
            user_id,
            stripe_customer_id: customer_id,
            stripe_subscription_id: subscription.id.to_string(),
            status: subscription.status.to_string(),
            current_period_end,
        },
    )
    .await?;

    log::info!(
        "Subscription {} for user {} is now '{}'",
        subscription.id,
        user_id,
        subscription.status
    );
    Ok(())
}

/// Maps a Stripe customer to our user: the users table first, the customer's
/// `user_id` metadata as fallback for customers created before the column
/// was backfilled.
async fn resolve_user_id(pool: &PgPool, client: &Client, customer_id: &str) -> Res<Uuid> {
    if let Some(user) = db::users::get_user_by_stripe_customer(pool, customer_id).await? {
        return Ok(user.id);
    }

    let parsed_id = customer_id
        .parse::<stripe::CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid customer ID: {}", e)))?;
    let customer = Customer::retrieve(client, &parsed_id, &[])
        .await
        .map_err(AppError::from)?;

    customer
        .metadata
        .as_ref()
        .and_then(|meta| meta.get("user_id"))
        .and_then(|raw| raw.parse::<Uuid>().ok())
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Stripe customer {} cannot be mapped to a user",
                customer_id
            ))
        })
}
