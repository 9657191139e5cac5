mod cors;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpResponse, HttpServer,
    web::{self},
};

use api_plan::services::engine::PlanEngine;
use api_plan::services::gemini::{GeminiClient, ItineraryGenerator};
use api_plan::services::store::PgEntitlementStore;
use catalog::SpotCatalog;
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();
    let cookie_secure = !origin.contains("localhost");

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // load the curated spot catalog once; shared immutably across workers
    let spot_catalog = Arc::new(SpotCatalog::load());
    log::info!("Loaded {} spots into the catalog", spot_catalog.len());

    if config.gemini_api_key.is_empty() {
        log::warn!("GEMINI_API_KEY is not set; itinerary generation will be unavailable");
    }

    // assemble the plan engine with its production collaborators
    let store = Arc::new(PgEntitlementStore::new(pool.clone()));
    let generator: Arc<dyn ItineraryGenerator> = Arc::new(GeminiClient::from_config(&config));
    let plan_engine = web::Data::new(PlanEngine::new(
        store,
        generator,
        spot_catalog.clone(),
        config.free_plan_quota,
        Duration::from_secs(config.generation_timeout_secs),
    ));

    HttpServer::new(move || {
        let secret = config_data.jwt_config.secret.as_bytes();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(spot_catalog.clone()))
            .app_data(plan_engine.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
                )
                .into()
            }))
            .wrap(limiter::global_middleware(10)) // max 10 requests per second
            .wrap(logger::middleware()) // 4th
            .wrap(extractor::middleware()) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(api_auth::session_middleware(cookie_secure, secret)) // 1st
            .service(
                web::scope("/api")
                    .service(api_auth::mount_auth())
                    .service(api_subs::mount_webhook())
                    .service(catalog::mount_spots())
                    .service(api_plan::mount_plan())
                    .service(
                        web::scope("/dashboard")
                            .wrap(api_auth::auth_middleware())
                            .service(api_auth::mount_user())
                            .service(api_subs::mount_subs()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
