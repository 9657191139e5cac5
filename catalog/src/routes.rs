use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::error::{AppError, Res};
use common::http::Success;
use serde::{Deserialize, Serialize};

use crate::SpotCatalog;
use crate::model::{Category, Prefecture, Spot};

#[derive(Debug, Deserialize)]
pub struct SpotListQuery {
    pub prefecture: Option<Prefecture>,
    pub category: Option<Category>,
}

#[derive(Serialize)]
struct SpotListResponse<'a> {
    spots: Vec<&'a Spot>,
}

/// Lists catalog spots, optionally filtered by prefecture and category.
///
/// # Input
/// - `query`: optional `prefecture` (Kumamoto, Oita, Miyazaki) and
///   `category` (nature, history, onsen, food, activity, spiritual) filters
///
/// # Output
/// - Success: `{ "spots": [...] }` with the matching catalog entries
#[get("")]
pub async fn get_spots(
    query: web::Query<SpotListQuery>,
    catalog: web::Data<Arc<SpotCatalog>>,
) -> Res<impl Responder> {
    let spots = catalog.filter(query.prefecture, query.category);
    Success::ok(SpotListResponse { spots })
}

/// Retrieves a single spot by its stable identifier.
#[get("/{id}")]
pub async fn get_spot(
    path: web::Path<String>,
    catalog: web::Data<Arc<SpotCatalog>>,
) -> Res<impl Responder> {
    let id = path.into_inner();
    let spot = catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("No spot with id '{}'", id)))?;
    Success::ok(spot)
}
