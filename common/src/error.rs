use actix_web::HttpResponse;
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("Resource conflict: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    // === GENERATION ERRORS ===
    #[error("{0}")]
    GenerationTimeout(String),

    #[error("{0}")]
    GenerationMalformed(String),

    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for failures a client branches UI on,
    /// e.g. showing a sign-in prompt versus an upgrade prompt.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::Unauthorized(_) => Some("auth_required"),
            AppError::QuotaExceeded(_) => Some("upgrade_required"),
            AppError::GenerationTimeout(_) => Some("generation_timeout"),
            _ => None,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self.code() {
            Some(code) => serde_json::json!({ "error": self.to_string(), "code": code }),
            None => serde_json::json!({ "error": self.to_string() }),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                serde_json::json!({ "error": err_msg })
            } else {
                serde_json::json!({ "error": "Internal server error" })
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Database(error) => {
                log::error!("Database error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::JWT(error) => {
                log::error!("JWT error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Stripe(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }

            // === APPLICATION ERRORS ===
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(self.body()),
            AppError::QuotaExceeded(_) => HttpResponse::Forbidden().json(self.body()),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(self.body()),
            AppError::NotFound(_) => HttpResponse::NotFound().json(self.body()),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(self.body()),
            AppError::TooManyRequests(_) => HttpResponse::TooManyRequests().json(self.body()),

            // === GENERATION ERRORS ===
            AppError::GenerationTimeout(_) => HttpResponse::GatewayTimeout().json(self.body()),
            AppError::GenerationMalformed(error) => {
                log::error!("Malformed generation output: {}", error);
                HttpResponse::InternalServerError().json(self.body())
            }
            AppError::ProviderUnavailable(error) => {
                log::error!("Generation provider unavailable: {}", error);
                HttpResponse::InternalServerError().json(self.body())
            }

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn unauthorized_carries_auth_code() {
        let err = AppError::Unauthorized("Sign in to continue".to_string());
        assert_eq!(err.code(), Some("auth_required"));
        assert_eq!(err.to_http_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn quota_exceeded_maps_to_forbidden_with_upgrade_code() {
        let err = AppError::QuotaExceeded("Free plan used up".to_string());
        assert_eq!(err.code(), Some("upgrade_required"));
        assert_eq!(err.to_http_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generation_timeout_maps_to_gateway_timeout() {
        let err = AppError::GenerationTimeout("Itinerary took too long".to_string());
        assert_eq!(err.code(), Some("generation_timeout"));
        assert_eq!(err.to_http_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn bad_request_has_no_machine_code() {
        let err = AppError::BadRequest("days must be between 1 and 7".to_string());
        assert_eq!(err.code(), None);
        assert_eq!(err.to_http_response().status(), StatusCode::BAD_REQUEST);
    }
}
