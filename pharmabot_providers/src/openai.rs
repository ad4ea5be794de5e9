use async_trait::async_trait;
use pharmabot_core::{Completion, CompletionProvider, PromptRequest, ProviderError, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, info};

use crate::GenerationSettings;
use crate::http::{build_client, read_json, token_count, transport_error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Any endpoint speaking the OpenAI `chat/completions` dialect.
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    settings: GenerationSettings,
}

impl fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: String, settings: GenerationSettings) -> Result<Self, ProviderError> {
        info!("Creating OpenAiCompatibleProvider: model={}", settings.model);
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

    fn payload(&self, request: &PromptRequest) -> Value {
        let messages: Vec<Value> = request
            .messages()
            .iter()
            .map(|turn| json!({ "role": turn.role().as_str(), "content": turn.text() }))
            .collect();

        json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        })
    }

    fn parse_response(response: &Value) -> Result<Completion, ProviderError> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProviderError::MalformedResponse("missing content".to_string()))?;

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let mut completion = Completion::new(content);
        if let Some(u) = response["usage"].as_object() {
            completion = completion.with_usage(Usage {
                prompt_tokens: token_count(&u["prompt_tokens"]),
                completion_tokens: token_count(&u["completion_tokens"]),
                total_tokens: token_count(&u["total_tokens"]),
            });
        }
        Ok(completion)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError> {
        let payload = self.payload(request);

        info!(
            "Sending request to chat completions API: model={}",
            self.settings.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let completion = Self::parse_response(&read_json(response).await?)?;

        debug!("Received response from chat completions API");
        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "openai_compatible"
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

    fn provider() -> OpenAiCompatibleProvider {
        let settings = GenerationSettings {
            model: "glm-4-flash".to_string(),
            ..GenerationSettings::default()
        };
        OpenAiCompatibleProvider::new("sk-test".to_string(), settings)
            .unwrap_or_else(|e| panic!("client build failed: {e}"))
    }

    #[test]
    fn payload_keeps_system_entry_first() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("q"));
        transcript.append(Turn::assistant("a"));
        let request = PromptAssembler::build("persona", &transcript, "q2");

        let payload = provider().payload(&request);

        assert_eq!(payload["model"], "glm-4-flash");
        let roles: Vec<&str> = payload["messages"]
            .as_array()
            .map(|m| m.iter().filter_map(|v| v["role"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(payload["messages"][0]["content"], "persona");
    }

    #[test]
    fn parse_reads_content_and_usage() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Olá!" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12 }
        });

        let completion = OpenAiCompatibleProvider::parse_response(&body)
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(completion.text(), "Olá!");
        assert_eq!(
            completion.usage,
            Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12
            })
        );
    }

    #[test]
    fn parse_rejects_missing_content() {
        let body = json!({ "choices": [] });
        assert!(matches!(
            OpenAiCompatibleProvider::parse_response(&body),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unauthorized_status_is_classified() {
        let body = json!({ "error": { "message": "Incorrect API key provided" } }).to_string();
        let (base_url, server) = serve_once("HTTP/1.1 401 Unauthorized", body).await;

        let provider = provider().with_base_url(base_url);
        let request = PromptAssembler::build("persona", &Transcript::new(), "oi");

        let err = provider.complete(&request).await.err();
        assert!(matches!(err, Some(ProviderError::Unauthorized(_))));

        let raw = server.await.unwrap_or_default().to_lowercase();
        assert!(raw.starts_with("post /chat/completions"));
        assert!(raw.contains("authorization: bearer sk-test"));
    }
}
