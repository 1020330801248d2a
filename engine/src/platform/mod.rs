//! Social platform abstraction
//!
//! The cycle scheduler only talks to the platform through
//! [`SocialPlatform`]. The client owns the "already engaged" sets and
//! updates them itself when an action succeeds; the scheduler reads them
//! through [`SocialPlatform::engagement`] but never writes them.

pub mod moltbook;

pub use moltbook::MoltbookClient;

use async_trait::async_trait;
use sdk::errors::AgentError;
use sdk::{CommentRecord, PostRecord, ProfileRecord};
use std::collections::HashSet;

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Identifiers the agent has already acted on this session
#[derive(Debug, Clone, Default)]
pub struct EngagementState {
    pub replied: HashSet<String>,
    pub voted: HashSet<String>,
    pub subscribed: HashSet<String>,
}

impl EngagementState {
    pub fn has_replied(&self, post_id: &str) -> bool {
        self.replied.contains(post_id)
    }

    pub fn has_voted(&self, post_id: &str) -> bool {
        self.voted.contains(post_id)
    }

    pub fn has_subscriptions(&self) -> bool {
        !self.subscribed.is_empty()
    }
}

/// Parameters for a feed page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub sort: String,
    pub limit: usize,
    pub community: Option<String>,
    /// Use the subscription-based feed instead of the global one
    pub personalized: bool,
}

#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Name the agent posts under
    fn agent_name(&self) -> &str;

    fn engagement(&self) -> &EngagementState;

    async fn get_feed(&self, query: &FeedQuery) -> Result<Vec<PostRecord>>;

    /// Publish a post; cooldown and rate limits surface as errors
    async fn post(&mut self, content: &str, community: &str, title: Option<&str>) -> Result<()>;

    /// Top-level comment on a post; records the post as replied
    async fn reply(&mut self, post_id: &str, content: &str) -> Result<()>;

    async fn reply_to_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<()>;

    async fn get_post_comments(&self, post_id: &str, sort: &str) -> Result<Vec<CommentRecord>>;

    /// Records the post as voted
    async fn upvote(&mut self, post_id: &str) -> Result<()>;

    /// `None` when the platform has no such profile
    async fn get_profile(&self, author_name: &str) -> Result<Option<ProfileRecord>>;

    async fn semantic_search(
        &self,
        query: &str,
        kind: &str,
        limit: usize,
    ) -> Result<Vec<PostRecord>>;

    /// Records the community as subscribed
    async fn subscribe(&mut self, community: &str) -> Result<()>;
}
