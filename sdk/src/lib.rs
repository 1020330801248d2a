//! Molt Agent SDK
//!
//! Shared library providing the error taxonomy and the social platform
//! record types used by the engine and its collaborators.

/// Error types and handling
pub mod errors;

/// Social platform record types
pub mod types;

// Re-export commonly used types
pub use errors::{AgentError, AgentErrorExt};
pub use types::{AuthorRef, CommentRecord, FeedItem, PostRecord, ProfileRecord, ThreadComment};
