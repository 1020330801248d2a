//! Molt Engine Library
//!
//! This library provides the core functionality of the Molt agent.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Credential loading and secret scrubbing
pub mod secrets;

/// Generation client with credential rotation
pub mod llm;

/// Narrative memory (Memory, Soul, History)
pub mod memory;

/// Prompt construction
pub mod prompts;

/// Engagement filter and evaluator
pub mod engagement;

/// Social platform abstraction and Moltbook client
pub mod platform;

/// Cycle scheduler
pub mod agent;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
