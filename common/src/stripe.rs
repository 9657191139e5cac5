use std::collections::HashMap;

use stripe::{Client, CreateCustomer, Customer};
use uuid::Uuid;

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

/// Creates a Stripe customer carrying our user id in its metadata so webhook
/// events can always be traced back to an account.
pub async fn create_customer(client: &Client, user_id: Uuid, email: &str) -> Res<Customer> {
    let params = CreateCustomer {
        email: Some(email),
        metadata: Some(HashMap::from([("user_id".to_string(), user_id.to_string())])),
        ..Default::default()
    };

    Customer::create(client, params)
        .await
        .map_err(AppError::from)
}
