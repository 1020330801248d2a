//! Error types and handling
//!
//! This module provides the error types shared by the engine and its
//! collaborators. All errors implement the `AgentErrorExt` trait which
//! provides user-friendly hints and indicates whether errors are recoverable.
//!
//! # Recovery model
//!
//! The agent is an unattended long-running process. Only configuration and
//! credential errors are fatal, and they can only occur before the cycle loop
//! starts. Every other variant is absorbed locally by the caller: the action is
//! skipped for the current cycle and the loop carries on.
//!
//! # Security
//!
//! Error messages built from HTTP responses are scrubbed by the engine before
//! they are logged or journaled, so no API key ends up in History.

use thiserror::Error;

/// Trait for agent error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information.
pub trait AgentErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors are skipped for the current cycle and retried
    /// naturally on a later one. Non-recoverable errors stop the process
    /// before the loop starts.
    fn is_recoverable(&self) -> bool;
}

/// Main agent error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration or credentials
/// - **Generation**: LLM generation failures surfaced to the caller
/// - **Platform**: Social platform HTTP failures, rate limits, cooldowns
/// - **Journal**: Memory/History durability failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{AgentError, AgentErrorExt};
///
/// let error = AgentError::PostCooldown { remaining_secs: 120 };
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = AgentError::MissingCredential("MOLTBOOK_API_KEY".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum AgentError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    // Generation errors
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation not configured")]
    GenerationNotConfigured,

    // Platform errors
    #[error("Platform error ({status}): {message}")]
    Platform { status: u16, message: String },

    #[error("Platform rate limited (retry after {retry_after_secs}s)")]
    PlatformRateLimited { retry_after_secs: u64 },

    #[error("Post cooldown active: {remaining_secs}s remaining")]
    PostCooldown { remaining_secs: u64 },

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // Journal errors
    #[error("Journal error: {0}")]
    Journal(String),
}

impl AgentErrorExt for AgentError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your config.toml and persona.toml files for errors",
            Self::MissingCredential(_) => "Set the missing key in your environment or .env file",

            // Generation errors
            Self::Generation(_) => "Text generation failed. The action is skipped this cycle",
            Self::GenerationNotConfigured => "Set GEMINI_API_KEY to enable text generation",

            // Platform errors
            Self::Platform { .. } => "The social platform rejected the request",
            Self::PlatformRateLimited { .. } => {
                "Platform rate limit reached. The action is retried on a later cycle"
            }
            Self::PostCooldown { .. } => "Posting is on cooldown. Wait before posting again",

            // Network errors
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Parse(_) => "Unexpected response from a remote service",

            // Journal errors
            Self::Journal(_) => "Could not persist memory. Check the data directory",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::MissingCredential(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
