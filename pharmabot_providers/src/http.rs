use pharmabot_core::ProviderError;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_BODY: usize = 200;

pub fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

pub fn transport_error(err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Read a response body as JSON, turning non-2xx statuses into errors.
pub async fn read_json(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(&e))?;

    if !status.is_success() {
        return Err(ProviderError::from_status(
            status.as_u16(),
            error_message(&body),
        ));
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

/// Pull `error.message` out of an error body, or fall back to a prefix of
/// the raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect())
}

pub fn token_count(value: &Value) -> u32 {
    u32::try_from(value.as_u64().unwrap_or(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid");
    }

    #[test]
    fn error_message_truncates_plain_text() {
        let body = "x".repeat(1000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY);
    }

    #[test]
    fn token_count_saturates_to_zero() {
        assert_eq!(token_count(&serde_json::json!(42)), 42);
        assert_eq!(token_count(&serde_json::json!(u64::MAX)), 0);
        assert_eq!(token_count(&Value::Null), 0);
    }
}
