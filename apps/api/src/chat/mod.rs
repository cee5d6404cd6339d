//! Chat gateway client — the single point of entry for the hosted
//! language-model gateway. No other module may call the gateway directly.
//!
//! The gateway speaks the OpenAI-compatible chat-completions shape; requests
//! always carry the fixed knowledge prompt and ask for a streamed response.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;
pub mod prompts;
pub mod transcript;

/// The completion model requested from the gateway.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by the chat gateway")]
    RateLimited,

    #[error("Chat gateway payment required")]
    PaymentRequired,

    #[error("Gateway error (status {status}): {message}")]
    Gateway { status: u16, message: String },
}

impl ChatError {
    /// Visitor-facing message for a failed completion. Becomes the error
    /// turn in the transcript and the `{error}` body of the proxy response.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::RateLimited => "Rate limits exceeded, please try again later.",
            ChatError::PaymentRequired => {
                "Payment required, please add funds to your AI gateway workspace."
            }
            ChatError::Http(_) | ChatError::Gateway { .. } => "AI gateway error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ChatError::RateLimited => 429,
            ChatError::PaymentRequired => 402,
            ChatError::Http(_) | ChatError::Gateway { .. } => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// The single chat client used by the proxy route.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            url,
            api_key,
        }
    }

    /// Requests a streamed completion for the transcript, with the fixed
    /// knowledge prompt prepended. Returns the raw upstream response so the
    /// caller can forward its event stream. No retry: 429 and 402 map to
    /// their distinguished errors, any other non-2xx to a generic one.
    pub async fn stream(&self, messages: &[ChatMessage]) -> Result<reqwest::Response, ChatError> {
        let mut all = Vec::with_capacity(messages.len() + 1);
        all.push(ChatMessage::new("system", prompts::PORTFOLIO_SYSTEM_PROMPT));
        all.extend(messages.iter().cloned());

        let body = GatewayRequest {
            model: MODEL,
            messages: all,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            429 => {
                warn!("Chat gateway rate limited");
                Err(ChatError::RateLimited)
            }
            402 => {
                warn!("Chat gateway payment required");
                Err(ChatError::PaymentRequired)
            }
            _ if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                warn!("Chat gateway returned {status}: {message}");
                Err(ChatError::Gateway {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => {
                debug!("Chat gateway stream opened ({} transcript turns)", messages.len());
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_maps_to_429_with_specific_message() {
        let e = ChatError::RateLimited;
        assert_eq!(e.http_status(), 429);
        assert!(e.user_message().contains("Rate limits exceeded"));
    }

    #[test]
    fn test_payment_required_maps_to_402_with_specific_message() {
        let e = ChatError::PaymentRequired;
        assert_eq!(e.http_status(), 402);
        assert!(e.user_message().contains("Payment required"));
    }

    #[test]
    fn test_other_gateway_failures_are_generic_500() {
        let e = ChatError::Gateway {
            status: 503,
            message: "upstream unavailable".to_string(),
        };
        assert_eq!(e.http_status(), 500);
        assert_eq!(e.user_message(), "AI gateway error");
    }
}
