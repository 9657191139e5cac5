use std::sync::Arc;
use std::time::Duration;

use catalog::SpotCatalog;
use common::error::{AppError, Res};
use common::jwt::JwtClaims;
use tokio::time::timeout;
use uuid::Uuid;

use crate::dtos::plan::{ItineraryRequest, ItineraryResult};
use crate::services::gemini::ItineraryGenerator;
use crate::services::prompt;
use crate::services::store::EntitlementStore;

pub const MIN_TRIP_DAYS: u32 = 1;
pub const MAX_TRIP_DAYS: u32 = 7;

const SIGN_IN_MESSAGE: &str = "Sign in to generate an itinerary.";
const UPGRADE_MESSAGE: &str =
    "You have used your free itinerary. Upgrade to Pro for unlimited plans.";
const TIMEOUT_MESSAGE: &str = "Itinerary generation took too long. Please try again.";

/// Orchestrates one generation request: authentication, entitlement, the
/// free-tier quota, prompt construction, the provider call and response
/// validation. Stateless across invocations; all shared state lives behind
/// the injected store.
pub struct PlanEngine {
    store: Arc<dyn EntitlementStore>,
    generator: Arc<dyn ItineraryGenerator>,
    catalog: Arc<SpotCatalog>,
    free_quota: i32,
    deadline: Duration,
}

impl PlanEngine {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        generator: Arc<dyn ItineraryGenerator>,
        catalog: Arc<SpotCatalog>,
        free_quota: i32,
        deadline: Duration,
    ) -> Self {
        PlanEngine {
            store,
            generator,
            catalog,
            free_quota,
            deadline,
        }
    }

    /// Runs the guarded generation flow for one caller.
    ///
    /// The steps are strictly ordered: identity first, then entitlement and
    /// quota, and only then the expensive provider call, so a rejected
    /// request never pays provider cost.
    pub async fn generate(
        &self,
        caller: Option<&JwtClaims>,
        request: &ItineraryRequest,
    ) -> Res<ItineraryResult> {
        let claims =
            caller.ok_or_else(|| AppError::Unauthorized(SIGN_IN_MESSAGE.to_string()))?;

        let entitled = self.store.subscription_active(claims.user_id).await?;

        // cheap rejection for callers who already spent their free plan
        if !entitled && self.store.usage_count(claims.user_id).await? >= self.free_quota {
            return Err(AppError::QuotaExceeded(UPGRADE_MESSAGE.to_string()));
        }

        validate(request)?;

        let prompt = prompt::build_prompt(&self.catalog, request);

        // The authoritative quota gate. Claiming before the provider call
        // closes the window where two concurrent requests both pass a
        // read-only check; a unit is handed back if generation fails.
        let claimed = if entitled {
            false
        } else {
            if !self
                .store
                .claim_free_generation(claims.user_id, self.free_quota)
                .await?
            {
                return Err(AppError::QuotaExceeded(UPGRADE_MESSAGE.to_string()));
            }
            true
        };

        let text = match timeout(self.deadline, self.generator.generate_json(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                self.refund(claims.user_id, claimed).await;
                return Err(err);
            }
            Err(_) => {
                self.refund(claims.user_id, claimed).await;
                return Err(AppError::GenerationTimeout(TIMEOUT_MESSAGE.to_string()));
            }
        };

        match parse_itinerary(&text) {
            Ok(result) => Ok(result),
            Err(err) => {
                self.refund(claims.user_id, claimed).await;
                Err(err)
            }
        }
    }

    /// Best-effort release of a claimed unit. A failed release must not mask
    /// the original error, but silent quota drift is a correctness risk, so
    /// it is always logged.
    async fn refund(&self, user_id: Uuid, claimed: bool) {
        if !claimed {
            return;
        }
        if let Err(err) = self.store.release_free_generation(user_id).await {
            log::warn!(
                "Failed to release free generation for user {}: {}",
                user_id,
                err
            );
        }
    }
}

/// Server-side request validation. The web client bounds these values too,
/// but the UI bound is not authoritative.
pub fn validate(request: &ItineraryRequest) -> Res<()> {
    if request.days < MIN_TRIP_DAYS || request.days > MAX_TRIP_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between {} and {}",
            MIN_TRIP_DAYS, MAX_TRIP_DAYS
        )));
    }
    if request.interests.is_empty() {
        return Err(AppError::BadRequest(
            "Select at least one interest".to_string(),
        ));
    }
    Ok(())
}

/// Parses and structurally validates the provider's response. The provider
/// is instructed to return pure JSON, but its output is untrusted input.
pub fn parse_itinerary(text: &str) -> Res<ItineraryResult> {
    let result: ItineraryResult = serde_json::from_str(text).map_err(|e| {
        AppError::GenerationMalformed(format!("Provider returned an unparseable itinerary: {}", e))
    })?;

    if result.days.is_empty() {
        return Err(AppError::GenerationMalformed(
            "Provider returned an itinerary with no days".to_string(),
        ));
    }
    for day in &result.days {
        if day.day == 0 {
            return Err(AppError::GenerationMalformed(
                "Provider returned an invalid day number".to_string(),
            ));
        }
        if day.spots.is_empty() {
            return Err(AppError::GenerationMalformed(format!(
                "Provider returned no stops for day {}",
                day.day
            )));
        }
        if day.spots.iter().any(|s| s.name.is_empty()) {
            return Err(AppError::GenerationMalformed(format!(
                "Provider returned an unnamed stop on day {}",
                day.day
            )));
        }
    }

    Ok(result)
}
