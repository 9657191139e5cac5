use std::time::Duration;

use async_trait::async_trait;
use common::env_config::Config;
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The text-generation collaborator behind the plan endpoint. Injected as a
/// trait object so tests can substitute a fake provider.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    /// Returns the provider's raw response text for the given prompt. The
    /// provider is instructed to reply with pure JSON; callers still treat
    /// the text as untrusted input.
    async fn generate_json(&self, prompt: &str) -> Res<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        GeminiClient {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            Duration::from_secs(config.generation_timeout_secs),
        )
    }

    /// Points the client at a different endpoint, for tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }
}

#[async_trait]
impl ItineraryGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> Res<String> {
        // fail fast instead of paying a doomed network round trip
        if self.api_key.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            return Err(AppError::ProviderUnavailable(format!(
                "Gemini returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Gemini response decode: {}", e)))?;

        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "Gemini returned no candidates".to_string(),
            ));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", "gemini-2.0-flash", Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn returns_concatenated_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "{\"title\":" }, { "text": "\"Trip\"}" }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let text = client(&server).generate_json("plan a trip").await.unwrap();
        assert_eq!(text, "{\"title\":\"Trip\"}");
    }

    #[tokio::test]
    async fn provider_error_status_maps_to_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client(&server).generate_json("plan a trip").await.unwrap_err();
        assert!(matches!(err, AppError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_candidates_are_a_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server).generate_json("plan a trip").await.unwrap_err();
        assert!(matches!(err, AppError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeminiClient::new("", "gemini-2.0-flash", Duration::from_secs(5))
            .with_base_url(server.uri());
        let err = client.generate_json("plan a trip").await.unwrap_err();
        assert!(matches!(err, AppError::ProviderUnavailable(_)));
    }
}
