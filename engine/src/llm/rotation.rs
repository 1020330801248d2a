//! Credential rotation
//!
//! A [`ResilientGenerator`] tries the key at the pool cursor. A rate-limit
//! failure advances the cursor, waits a fixed backoff and retries with the
//! next key; any other failure ends the call. Retries are bounded by the
//! pool size, so a fully throttled pool fails once instead of looping.
//!
//! The cursor is not reset between calls. A later call starts from
//! whichever key last worked, which spreads load across the pool.

use super::{
    clean_output, GenerationBackend, GenerationOptions, LLMError, Result, TextGenerator,
};
use crate::secrets::SecretString;
use async_trait::async_trait;
use std::time::Duration;

/// Ordered API keys with a rotating cursor
#[derive(Debug, Clone)]
pub struct CredentialPool {
    keys: Vec<SecretString>,
    cursor: usize,
}

impl CredentialPool {
    pub fn new(keys: Vec<SecretString>) -> Self {
        Self { keys, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the key the next attempt will use
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Key at the cursor, `None` for an empty pool
    pub fn current(&self) -> Option<&SecretString> {
        self.keys.get(self.cursor)
    }

    /// Advance the cursor modulo the pool size and return the new index
    pub fn rotate(&mut self) -> usize {
        if !self.keys.is_empty() {
            self.cursor = (self.cursor + 1) % self.keys.len();
        }
        self.cursor
    }
}

/// Generator that rotates through a credential pool on rate limits
pub struct ResilientGenerator<B> {
    backend: B,
    pool: CredentialPool,
    options: GenerationOptions,
    backoff: Duration,
}

impl<B: GenerationBackend> ResilientGenerator<B> {
    pub fn new(backend: B, pool: CredentialPool) -> Self {
        Self {
            backend,
            pool,
            options: GenerationOptions::default(),
            backoff: Duration::from_millis(1000),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Wait applied after each rotation
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }
}

#[async_trait]
impl<B: GenerationBackend> TextGenerator for ResilientGenerator<B> {
    async fn generate(&mut self, prompt: &str) -> Result<String> {
        if self.pool.is_empty() {
            tracing::error!("No Gemini API keys configured");
            return Err(LLMError::NotConfigured);
        }

        let attempts = self.pool.len();
        for _ in 0..attempts {
            let Some(key) = self.pool.current() else {
                return Err(LLMError::NotConfigured);
            };

            match self.backend.generate(key, prompt, &self.options).await {
                Ok(text) => return Ok(clean_output(&text)),
                Err(e) if e.is_rate_limited() => {
                    let next = self.pool.rotate();
                    tracing::warn!(
                        "{} rate limit hit, rotating to key #{}",
                        self.backend.name(),
                        next + 1
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    tracing::error!("{} generation failed: {}", self.backend.name(), e);
                    return Err(e);
                }
            }
        }

        tracing::error!("All {} generation key(s) are rate limited", attempts);
        Err(LLMError::QuotaExhausted { attempts })
    }
}
