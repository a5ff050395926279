// SPDX-License-Identifier: PMPL-1.0-or-later
//! Chat-completions client for the advice endpoint

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AdvisorConfig;
use crate::error::{Error, Result};

/// Sequences that end the completion early
const STOP_SEQUENCES: [&str; 2] = ["Human:", "User:"];

/// One-shot client: a single POST per call, no retry or caching
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

impl ChatClient {
    /// Create a client; `None` when no usable API key is configured
    pub fn new(config: &AdvisorConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.effective_api_key() else {
            return Ok(None);
        };

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `prompt` as a single user message and return the trimmed reply
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            stop: &STOP_SEQUENCES,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            return Err(Error::Advisor(format!(
                "API request failed: {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await.map_err(Error::Http)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Advisor("Invalid API response format".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stop: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> AdvisorConfig {
        AdvisorConfig {
            api_key: Some("test-key".to_string()),
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            ..AdvisorConfig::default()
        }
    }

    #[test]
    fn test_no_key_no_client() {
        assert!(ChatClient::new(&AdvisorConfig::default()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(bearer_token("test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 800,
                "stop": ["Human:", "User:"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  advice text \n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&config(&server)).unwrap().unwrap();
        assert_eq!(client.complete("hello").await.unwrap(), "advice text");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = ChatClient::new(&config(&server)).unwrap().unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, Error::Advisor(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_missing_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let client = ChatClient::new(&config(&server)).unwrap().unwrap();
        assert!(matches!(client.complete("hello").await, Err(Error::Advisor(_))));
    }
}
