use actix_web::web;

pub mod dtos {
    pub mod plan;
}

pub mod routes {
    pub mod plan;
}

pub mod services {
    pub mod engine;
    pub mod gemini;
    pub mod prompt;
    pub mod store;
}

pub fn mount_plan() -> actix_web::Scope {
    web::scope("/plan").service(routes::plan::post_plan)
}
