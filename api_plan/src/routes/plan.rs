use actix_web::{HttpRequest, Responder, post, web};
use common::error::Res;
use common::http::Success;
use common::jwt;

use crate::dtos::plan::ItineraryRequest;
use crate::services::engine::PlanEngine;

/// Generates a day-by-day itinerary for the authenticated caller.
///
/// # Input
/// - `days`: trip length, 1 to 7
/// - `interests`: non-empty list of interest tags
/// - `pace`: "relaxed", "moderate" or "packed"
/// - `prefecture`: "all" or one of the prefectures
/// - `spotId`: optional catalog spot the itinerary must include
///
/// # Output
/// - 200: the generated itinerary
/// - 401 `auth_required`: caller must sign in
/// - 403 `upgrade_required`: free plan spent, subscription needed
/// - 400: malformed request
/// - 500: provider failure or missing provider credentials
///
/// Authentication is checked inside the engine rather than by a scope
/// guard so the response always carries the machine-readable code the web
/// client branches on.
#[post("")]
pub async fn post_plan(
    req: HttpRequest,
    body: web::Json<ItineraryRequest>,
    engine: web::Data<PlanEngine>,
) -> Res<impl Responder> {
    let claims = jwt::claims_from_request(&req);
    let itinerary = engine.generate(claims.as_ref(), &body).await?;
    Success::ok(itinerary)
}
