use async_trait::async_trait;
use pharmabot_core::{
    Completion, CompletionProvider, PromptRequest, ProviderError, Role, Usage,
};
use reqwest::Client;
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, info};

use crate::GenerationSettings;
use crate::http::{build_client, read_json, token_count, transport_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    settings: GenerationSettings,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    pub fn new(api_key: String, settings: GenerationSettings) -> Result<Self, ProviderError> {
        info!("Creating GeminiProvider: model={}", settings.model);
        Ok(Self {
            client: build_client(settings.timeout)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            settings,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.settings.model
        )
    }

    /// Gemini keeps the persona out of `contents` and names the assistant
    /// role `model`.
    fn payload(&self, request: &PromptRequest) -> Value {
        let contents: Vec<Value> = request
            .conversation()
            .iter()
            .map(|turn| {
                let role = match turn.role() {
                    Role::Assistant => "model",
                    Role::User | Role::System => "user",
                };
                json!({
                    "role": role,
                    "parts": [{ "text": turn.text() }],
                })
            })
            .collect();

        json!({
            "systemInstruction": {
                "parts": [{ "text": request.system().text() }],
            },
            "contents": contents,
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
            },
        })
    }

    fn parse_response(response: &Value) -> Result<Completion, ProviderError> {
        let Some(parts) = response["candidates"][0]["content"]["parts"].as_array() else {
            if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
                return Err(ProviderError::MalformedResponse(format!(
                    "prompt blocked: {reason}"
                )));
            }
            return Err(ProviderError::MalformedResponse(
                "missing candidates[0].content.parts".to_string(),
            ));
        };

        let content: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let mut completion = Completion::new(content);
        if let Some(meta) = response["usageMetadata"].as_object() {
            completion = completion.with_usage(Usage {
                prompt_tokens: token_count(&meta["promptTokenCount"]),
                completion_tokens: token_count(&meta["candidatesTokenCount"]),
                total_tokens: token_count(&meta["totalTokenCount"]),
            });
        }
        Ok(completion)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError> {
        let payload = self.payload(request);

        info!(
            "Sending request to Gemini API: model={}, messages={}",
            self.settings.model,
            request.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_json(response).await?;
        let completion = Self::parse_response(&body)?;

        debug!("Received response from Gemini API: {} chars", completion.text().len());
        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;
    use pharmabot_core::{PromptAssembler, Transcript, Turn};

    fn provider() -> GeminiProvider {
        GeminiProvider::new("test-key".to_string(), GenerationSettings::default())
            .unwrap_or_else(|e| panic!("client build failed: {e}"))
    }

    fn scenario_request() -> PromptRequest {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("Qual a dose de paracetamol para um adulto?"));
        transcript.append(Turn::assistant("500mg a cada 6 horas"));
        PromptAssembler::build("persona", &transcript, "E para uma criança?")
    }

    #[test]
    fn payload_maps_roles_and_persona() {
        let payload = provider().payload(&scenario_request());

        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "persona");
        let contents = payload["contents"].as_array().map_or(0, Vec::len);
        assert_eq!(contents, 3);
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(payload["contents"][1]["role"], "model");
        assert_eq!(payload["contents"][1]["parts"][0]["text"], "500mg a cada 6 horas");
        assert_eq!(payload["contents"][2]["parts"][0]["text"], "E para uma criança?");
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn parse_joins_parts_and_reads_usage() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Para crianças, " }, { "text": "a dose depende do peso." }]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 40,
                "candidatesTokenCount": 12,
                "totalTokenCount": 52
            }
        });

        let completion = GeminiProvider::parse_response(&body)
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(completion.text(), "Para crianças, a dose depende do peso.");
        assert_eq!(completion.turn.role(), Role::Assistant);
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(52));
    }

    #[test]
    fn parse_reports_blocked_prompt() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiProvider::parse_response(&body).err();
        assert!(matches!(err, Some(ProviderError::MalformedResponse(msg)) if msg.contains("SAFETY")));
    }

    #[test]
    fn parse_rejects_blank_text() {
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(matches!(
            GeminiProvider::parse_response(&body),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn complete_round_trips_over_http() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "500mg a cada 6 horas" }] } }]
        })
        .to_string();
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", body).await;

        let provider = provider().with_base_url(base_url);
        let request = PromptAssembler::build(
            "persona",
            &Transcript::new(),
            "Qual a dose de paracetamol para um adulto?",
        );
        let completion = provider
            .complete(&request)
            .await
            .unwrap_or_else(|e| panic!("complete failed: {e}"));

        assert_eq!(completion.text(), "500mg a cada 6 horas");
        let raw = server.await.unwrap_or_default();
        assert!(raw.starts_with("POST /models/gemini-2.5-flash:generateContent"));
        assert!(raw.to_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn complete_maps_quota_status() {
        let body = json!({ "error": { "code": 429, "message": "Resource exhausted" } }).to_string();
        let (base_url, _server) = serve_once("HTTP/1.1 429 Too Many Requests", body).await;

        let provider = provider().with_base_url(base_url);
        let request = PromptAssembler::build("persona", &Transcript::new(), "oi");

        let err = provider.complete(&request).await.err();
        assert!(matches!(err, Some(ProviderError::QuotaExceeded(msg)) if msg == "Resource exhausted"));
    }
}
