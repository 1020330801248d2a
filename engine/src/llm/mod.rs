//! Generation Client Abstraction Layer
//!
//! This module defines the contract the rest of the agent uses to turn a
//! prompt into text. Two traits split the work:
//!
//! - [`GenerationBackend`] performs exactly one request with one API key
//!   (the Gemini REST client implements it).
//! - [`TextGenerator`] is what callers see: prompt in, cleaned text out.
//!   [`rotation::ResilientGenerator`] implements it on top of a backend and
//!   a rotating credential pool.

use crate::secrets::SecretString;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod rotation;

pub use gemini::GeminiProvider;
pub use rotation::{CredentialPool, ResilientGenerator};

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during generation
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("No generation API keys configured")]
    NotConfigured,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Quota exhausted on all {attempts} configured key(s)")]
    QuotaExhausted { attempts: usize },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Markers that identify a quota or rate-limit failure in an error message
const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "quota",
    "resource_exhausted",
    "too many requests",
    "rate limit",
];

impl LLMError {
    /// Whether this failure should trigger a credential rotation
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LLMError::RateLimitExceeded => true,
            LLMError::NotConfigured | LLMError::QuotaExhausted { .. } => false,
            other => {
                let message = other.to_string().to_lowercase();
                RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m))
            }
        }
    }
}

impl From<LLMError> for sdk::errors::AgentError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::NotConfigured => sdk::errors::AgentError::GenerationNotConfigured,
            other => sdk::errors::AgentError::Generation(other.to_string()),
        }
    }
}

/// Sampling options forwarded with every request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn from_config(config: &crate::config::LLMConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// A single-request generation backend
///
/// The key is passed per call so a rotation never needs to rebuild the
/// backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the name of the backend (e.g., "gemini")
    fn name(&self) -> &str;

    /// Perform one generation request with the given key
    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String>;
}

/// Prompt-to-text contract consumed by the cycle scheduler
///
/// Takes `&mut self` because implementations may advance internal state
/// (such as a credential cursor) on every call.
#[async_trait]
pub trait TextGenerator: Send {
    async fn generate(&mut self, prompt: &str) -> Result<String>;
}

/// Strip surrounding whitespace and quote characters from model output
pub fn clean_output(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"')
        .to_string()
}
