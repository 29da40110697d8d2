//! Model gateway: the single point of entry for all generative-model calls.
//!
//! No other module may call the model endpoint directly. Exactly one endpoint
//! variant is active per gateway instance, fixed at construction.
//!
//! Failed calls are never retried here; callers resubmit.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Biased toward deterministic, concise structured output.
const TEMPERATURE: f32 = 0.3;
const TOP_K: u32 = 40;
const TOP_P: f32 = 0.8;
const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model endpoint misconfigured: {0}")]
    Configuration(String),

    #[error("AI service rate limit exceeded: {0}")]
    RemoteRateLimited(String),

    #[error("AI service request failed: {0}")]
    Transport(String),

    #[error("AI service returned an unexpected response: {0}")]
    InvalidResponseShape(String),
}

/// Which endpoint configuration served a request. Reported in analysis metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointVariant {
    Primary,
    Alternate,
}

/// Resolved endpoint: API key in the query string (Primary) or a bearer
/// token header (Alternate).
#[derive(Clone)]
pub enum Endpoint {
    Primary { url: String, api_key: String },
    Alternate { url: String, token: String },
}

impl Endpoint {
    /// Resolves the active variant from startup configuration.
    /// A missing URL or credential for the selected variant is fatal.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        if config.use_alternate_endpoint {
            let url = config.alternate_api_url.clone().ok_or_else(|| {
                GatewayError::Configuration(
                    "ALTERNATE_API_URL is required when USE_ALTERNATE_ENDPOINT is set".to_string(),
                )
            })?;
            let token = config.alternate_api_token.clone().ok_or_else(|| {
                GatewayError::Configuration(
                    "ALTERNATE_API_TOKEN is required when USE_ALTERNATE_ENDPOINT is set"
                        .to_string(),
                )
            })?;
            Ok(Endpoint::Alternate { url, token })
        } else {
            let api_key = config.gemini_api_key.clone().ok_or_else(|| {
                GatewayError::Configuration("GEMINI_API_KEY is required".to_string())
            })?;
            Ok(Endpoint::Primary {
                url: config.gemini_api_url.clone(),
                api_key,
            })
        }
    }

    pub fn variant(&self) -> EndpointVariant {
        match self {
            Endpoint::Primary { .. } => EndpointVariant::Primary,
            Endpoint::Alternate { .. } => EndpointVariant::Alternate,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Endpoint::Primary { url, .. } | Endpoint::Alternate { url, .. } => url,
        }
    }

    /// Starts a POST with the variant's URL and credential attached.
    fn post(&self, client: &Client) -> RequestBuilder {
        match self {
            Endpoint::Primary { url, api_key } => {
                client.post(url).query(&[("key", api_key.as_str())])
            }
            Endpoint::Alternate { url, token } => client.post(url).bearer_auth(token),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("variant", &self.variant())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    error: RemoteErrorBody,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: String,
}

/// The gateway seam. The orchestrator holds an `Arc<dyn ModelGateway>` so tests
/// can substitute a canned model.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    fn variant(&self) -> EndpointVariant;

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// HTTP gateway over a generateContent-style endpoint.
#[derive(Debug, Clone)]
pub struct HttpModelGateway {
    client: Client,
    endpoint: Endpoint,
    timeout: Duration,
}

impl HttpModelGateway {
    pub fn new(endpoint: Endpoint) -> Result<Self, GatewayError> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(endpoint: Endpoint, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    fn variant(&self) -> EndpointVariant {
        self.endpoint.variant()
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .endpoint
            .post(&self.client)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Transport(format!(
                        "request timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = remote_message(status, &body);
            warn!(%status, variant = ?self.variant(), "model endpoint returned an error");
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                GatewayError::RemoteRateLimited(message)
            } else {
                GatewayError::Transport(message)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponseShape(e.to_string()))?;

        let text = parsed.text().ok_or_else(|| {
            GatewayError::InvalidResponseShape("no candidate text in response".to_string())
        })?;

        debug!(chars = text.len(), variant = ?self.variant(), "model call succeeded");
        Ok(text.to_string())
    }
}

/// Prefers the remote's own `error.message`, then the raw body, then the status line.
fn remote_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RemoteError>(body) {
        return parsed.error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
