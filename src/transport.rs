use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Mutex;

use crate::error::{Result, ValuesFinderError};
use crate::models::{GeminiErrorWrapper, GeminiRequest, GeminiResponse};

#[cfg(test)]
use mockall::automock;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generates text from a single self-contained prompt.
///
/// Calls carry no conversation state; everything the model needs must be in
/// the prompt.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// Gemini REST `generateContent` client
pub struct GeminiTransport {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ValuesFinderError::Config(
                "Gemini API key is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    /// Point the transport at another endpoint (proxies, local stubs)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTransport {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending prompt to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GeminiRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                ValuesFinderError::Generation(format!("Failed to send request to Gemini API: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_http_error(status, &body));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            ValuesFinderError::Generation(format!("Failed to parse Gemini API response: {e}"))
        })?;

        parsed.text().ok_or_else(|| {
            ValuesFinderError::Generation("Gemini API returned no text in the response".to_string())
        })
    }
}

fn map_http_error(status: StatusCode, body: &str) -> ValuesFinderError {
    let message = serde_json::from_str::<GeminiErrorWrapper>(body)
        .ok()
        .and_then(|w| {
            let msg = w.error.message?;
            Some(match w.error.status {
                Some(s) if !s.is_empty() => format!("{s}: {msg}"),
                _ => msg,
            })
        })
        .unwrap_or_else(|| body.to_string());
    ValuesFinderError::Generation(format!("Gemini API error ({}): {message}", status.as_u16()))
}

/// Replies with a fixed text (or a fixed failure) and records every prompt
pub struct StaticTransport {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StaticTransport {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply.clone().map_err(ValuesFinderError::Generation)
    }
}
