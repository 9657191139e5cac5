use actix_web::HttpResponse;
use serde::Serialize;

use super::error::Res;

pub struct Success;
impl Success {
    pub fn created<T: Serialize>(body: T) -> Res<HttpResponse> {
        Result::Ok(HttpResponse::Created().json(body))
    }
    pub fn ok<T: Serialize>(body: T) -> Res<HttpResponse> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
}
