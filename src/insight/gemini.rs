use crate::config::InsightSettings;
use crate::insight::{InsightFailure, InsightService};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The Gemini `generateContent` REST endpoint, asked for JSON output constrained to the insight
/// schema.
pub struct GeminiService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiService {
    /// Reads the API key from the environment now. A missing key is only reported when a request
    /// is made.
    pub fn new(settings: &InsightSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint().to_string(),
            model: settings.model().to_string(),
            api_key_env: settings.api_key_env().to_string(),
            api_key: settings.api_key(),
        }
    }

    fn url(&self) -> Result<Url, InsightFailure> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        Url::parse(&raw).map_err(|e| InsightFailure::Transport(format!("bad endpoint {raw}: {e}")))
    }
}

#[async_trait::async_trait]
impl InsightService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String, InsightFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| InsightFailure::MissingApiKey(self.api_key_env.clone()))?;
        let url = self.url()?;
        debug!("Requesting an insight from {url}");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| InsightFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InsightFailure::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(InsightFailure::Status(status.as_u16(), body));
        }
        response_text(&body)
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "summary": {
                        "type": "STRING",
                        "description": "Resumen ejecutivo del análisis"
                    },
                    "recommendations": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Lista de recomendaciones estratégicas"
                    },
                    "trend": {
                        "type": "STRING",
                        "enum": ["up", "down", "stable"],
                        "description": "Tendencia general de los ingresos"
                    }
                },
                "required": ["summary", "recommendations", "trend"]
            }
        }
    })
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the generated text out of a `generateContent` response body.
fn response_text(body: &str) -> Result<String, InsightFailure> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| InsightFailure::Envelope(e.to_string()))?;
    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
        .map(|t| t.trim().to_string())
        .ok_or_else(|| InsightFailure::Envelope("no candidate text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let settings = InsightSettings::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-3-flash-preview",
            "UNSET_BIBLIOPAY_TEST_KEY",
        );
        let service = GeminiService::new(&settings);
        assert_eq!(
            service.url().unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let settings = InsightSettings::new("http://127.0.0.1:9", "m", "UNSET_BIBLIOPAY_TEST_KEY");
        let service = GeminiService::new(&settings);
        let err = service.generate("hola").await.unwrap_err();
        assert!(matches!(err, InsightFailure::MissingApiKey(_)));
    }

    #[test]
    fn test_request_body_asks_for_schema() {
        let body = request_body("hola");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hola");
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["required"], json!(["summary", "recommendations", "trend"]));
        assert_eq!(
            schema["properties"]["trend"]["enum"],
            json!(["up", "down", "stable"])
        );
    }

    #[test]
    fn test_response_text() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "  {\"a\": 1}\n" }], "role": "model" } }
            ],
            "usageMetadata": {}
        }"#;
        assert_eq!(response_text(body).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_response_without_candidates() {
        assert!(matches!(
            response_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(InsightFailure::Envelope(_))
        ));
        assert!(matches!(
            response_text("<html>"),
            Err(InsightFailure::Envelope(_))
        ));
    }
}
