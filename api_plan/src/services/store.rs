use std::sync::Arc;

use async_trait::async_trait;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

/// Subscription state and the free-tier usage ledger, as seen by the plan
/// engine. A trait so route-level tests can run against an in-memory fake.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Whether the user holds an active subscription and is therefore
    /// unlimited.
    async fn subscription_active(&self, user_id: Uuid) -> Res<bool>;

    /// Current free-tier usage count. Missing ledger row reads as zero.
    async fn usage_count(&self, user_id: Uuid) -> Res<i32>;

    /// Atomically claims one free generation; `false` means the cap is
    /// already spent.
    async fn claim_free_generation(&self, user_id: Uuid, cap: i32) -> Res<bool>;

    /// Returns a claimed unit after a failed generation.
    async fn release_free_generation(&self, user_id: Uuid) -> Res<()>;
}

/// Production store backed by the subscriptions and plan_usage tables.
pub struct PgEntitlementStore {
    pool: Arc<PgPool>,
}

impl PgEntitlementStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgEntitlementStore { pool }
    }
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn subscription_active(&self, user_id: Uuid) -> Res<bool> {
        db::subscriptions::is_active(&*self.pool, user_id).await
    }

    async fn usage_count(&self, user_id: Uuid) -> Res<i32> {
        db::usage::get_usage(&*self.pool, user_id).await
    }

    async fn claim_free_generation(&self, user_id: Uuid, cap: i32) -> Res<bool> {
        db::usage::claim_free_generation(&*self.pool, user_id, cap).await
    }

    async fn release_free_generation(&self, user_id: Uuid) -> Res<()> {
        db::usage::release_free_generation(&*self.pool, user_id).await
    }
}
