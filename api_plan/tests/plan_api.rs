use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use api_plan::services::engine::PlanEngine;
use api_plan::services::gemini::ItineraryGenerator;
use api_plan::services::store::EntitlementStore;
use catalog::SpotCatalog;
use common::env_config::{Config, JwtConfig};
use common::error::{AppError, Res};
use common::jwt::{self, ClaimsSpec};

const VALID_PLAN: &str = r#"{
    "title": "Kumamoto in Three Days",
    "overview": "Volcano country, castle town and onsen villages.",
    "days": [
        { "day": 1, "title": "Aso", "spots": [
            { "name": "Mount Aso Caldera", "description": "Crater rim walk.", "time": "9:00 AM - 12:00 PM", "tip": "Arrive before the tour buses at 10." }
        ]},
        { "day": 2, "title": "Kurokawa", "spots": [
            { "name": "Kurokawa Onsen", "description": "Bath-hopping afternoon.", "time": "1:00 PM - 6:00 PM", "tip": "The cave bath is quietest right at opening." }
        ]},
        { "day": 3, "title": "Castle day", "spots": [
            { "name": "Kumamoto Castle", "description": "Restoration exhibits.", "time": "10:00 AM - 1:00 PM", "tip": "Lunch on basashi in the Sakura-no-baba arcade." }
        ]}
    ]
}"#;

struct FakeStore {
    subscribed: Mutex<HashMap<Uuid, bool>>,
    usage: Mutex<HashMap<Uuid, i32>>,
}

impl FakeStore {
    fn new() -> Self {
        FakeStore {
            subscribed: Mutex::new(HashMap::new()),
            usage: Mutex::new(HashMap::new()),
        }
    }

    fn subscribe(&self, user_id: Uuid) {
        self.subscribed.lock().unwrap().insert(user_id, true);
    }

    fn set_usage(&self, user_id: Uuid, used: i32) {
        self.usage.lock().unwrap().insert(user_id, used);
    }

    fn used(&self, user_id: Uuid) -> i32 {
        *self.usage.lock().unwrap().get(&user_id).unwrap_or(&0)
    }
}

#[async_trait]
impl EntitlementStore for FakeStore {
    async fn subscription_active(&self, user_id: Uuid) -> Res<bool> {
        Ok(*self.subscribed.lock().unwrap().get(&user_id).unwrap_or(&false))
    }

    async fn usage_count(&self, user_id: Uuid) -> Res<i32> {
        Ok(self.used(user_id))
    }

    async fn claim_free_generation(&self, user_id: Uuid, cap: i32) -> Res<bool> {
        let mut usage = self.usage.lock().unwrap();
        let used = usage.entry(user_id).or_insert(0);
        if *used >= cap {
            return Ok(false);
        }
        *used += 1;
        Ok(true)
    }

    async fn release_free_generation(&self, user_id: Uuid) -> Res<()> {
        let mut usage = self.usage.lock().unwrap();
        let used = usage.entry(user_id).or_insert(0);
        *used = (*used - 1).max(0);
        Ok(())
    }
}

struct FakeGenerator {
    body: String,
    calls: AtomicUsize,
}

impl FakeGenerator {
    fn returning(body: &str) -> Self {
        FakeGenerator {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ItineraryGenerator for FakeGenerator {
    async fn generate_json(&self, _prompt: &str) -> Res<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.body.is_empty() {
            return Err(AppError::ProviderUnavailable("no provider".to_string()));
        }
        Ok(self.body.clone())
    }
}

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        environment: "development".to_string(),
        database_url: "postgresql://localhost/unused".to_string(),
        jwt_config: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiration_hours: 1,
        },
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        num_workers: 1,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        console_logging_enabled: false,
        site_url: "http://localhost:3000".to_string(),
        stripe_secret_key: String::new(),
        stripe_webhook_secret: String::new(),
        stripe_price_id: String::new(),
        gemini_api_key: String::new(),
        gemini_model: "gemini-2.0-flash".to_string(),
        generation_timeout_secs: 2,
        free_plan_quota: 1,
    })
}

fn bearer_for(config: &Config, user_id: Uuid) -> String {
    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id,
            email: "traveler@example.com".to_string(),
            stripe_customer_id: None,
        },
        &config.jwt_config,
    )
    .unwrap();
    format!("Bearer {}", token)
}

macro_rules! plan_app {
    ($config:expr, $store:expr, $generator:expr) => {{
        let engine = PlanEngine::new(
            $store.clone(),
            $generator.clone(),
            Arc::new(SpotCatalog::load()),
            $config.free_plan_quota,
            Duration::from_secs($config.generation_timeout_secs),
        );
        test::init_service(
            App::new()
                .app_data(web::Data::new($config.clone()))
                .app_data(web::Data::new(engine))
                .wrap(extractor::middleware())
                .service(web::scope("/api").service(api_plan::mount_plan())),
        )
        .await
    }};
}

fn plan_request() -> Value {
    json!({
        "days": 3,
        "interests": ["Nature & Hiking"],
        "pace": "moderate",
        "prefecture": "Kumamoto"
    })
}

#[actix_web::test]
async fn anonymous_caller_gets_401_with_auth_code() {
    let config = test_config();
    let store: Arc<FakeStore> = Arc::new(FakeStore::new());
    let generator = Arc::new(FakeGenerator::returning(VALID_PLAN));
    let app = plan_app!(config, store, generator);

    let req = test::TestRequest::post()
        .uri("/api/plan")
        .set_json(plan_request())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status().as_u16(), 401);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "auth_required");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn free_user_gets_one_plan_then_upgrade_required() {
    let config = test_config();
    let store: Arc<FakeStore> = Arc::new(FakeStore::new());
    let generator = Arc::new(FakeGenerator::returning(VALID_PLAN));
    let app = plan_app!(config, store, generator);

    let user_id = Uuid::new_v4();
    let bearer = bearer_for(&config, user_id);

    let req = test::TestRequest::post()
        .uri("/api/plan")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(plan_request())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status().as_u16(), 200);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["days"].as_array().unwrap().len(), 3);
    assert_eq!(body["days"][0]["spots"][0]["name"], "Mount Aso Caldera");
    assert_eq!(store.used(user_id), 1);

    // identical request again: the free plan is spent
    let req = test::TestRequest::post()
        .uri("/api/plan")
        .insert_header(("Authorization", bearer))
        .set_json(plan_request())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status().as_u16(), 403);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "upgrade_required");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn subscriber_with_spent_counter_is_unlimited() {
    let config = test_config();
    let store: Arc<FakeStore> = Arc::new(FakeStore::new());
    let generator = Arc::new(FakeGenerator::returning(VALID_PLAN));

    let user_id = Uuid::new_v4();
    store.subscribe(user_id);
    store.set_usage(user_id, 5);

    let app = plan_app!(config, store, generator);
    let bearer = bearer_for(&config, user_id);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/plan")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(plan_request())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
    }

    // ledger untouched for entitled users
    assert_eq!(store.used(user_id), 5);
}

#[actix_web::test]
async fn out_of_range_days_is_a_400() {
    let config = test_config();
    let store: Arc<FakeStore> = Arc::new(FakeStore::new());
    let generator = Arc::new(FakeGenerator::returning(VALID_PLAN));
    let app = plan_app!(config, store, generator);

    let req = test::TestRequest::post()
        .uri("/api/plan")
        .insert_header(("Authorization", bearer_for(&config, Uuid::new_v4())))
        .set_json(json!({
            "days": 12,
            "interests": ["Photography"],
            "pace": "packed",
            "prefecture": "all"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn malformed_provider_output_is_a_500_and_refunds_the_user() {
    let config = test_config();
    let store: Arc<FakeStore> = Arc::new(FakeStore::new());
    let generator = Arc::new(FakeGenerator::returning("```json not actually json"));
    let app = plan_app!(config, store, generator);

    let user_id = Uuid::new_v4();
    let req = test::TestRequest::post()
        .uri("/api/plan")
        .insert_header(("Authorization", bearer_for(&config, user_id)))
        .set_json(plan_request())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(store.used(user_id), 0);
}
