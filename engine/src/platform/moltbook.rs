//! Moltbook REST client

use super::{EngagementState, FeedQuery, Result, SocialPlatform};
use crate::config::PlatformConfig;
use crate::memory::char_prefix;
use crate::secrets::{scrub_secrets, SecretString};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use sdk::errors::AgentError;
use sdk::{CommentRecord, PostRecord, ProfileRecord};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

/// Retry hint used when a post is rate limited without one
const DEFAULT_POST_RETRY_SECS: u64 = 1800;

pub struct MoltbookClient {
    base_url: String,
    agent_name: String,
    client: Client,
    post_cooldown: Duration,
    last_post: Option<Instant>,
    state: EngagementState,
}

impl MoltbookClient {
    pub fn new(
        config: &PlatformConfig,
        api_key: &SecretString,
        agent_name: impl Into<String>,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.unsecure()))
            .map_err(|_| {
                AgentError::Config("MOLTBOOK_API_KEY is not a valid header value".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent_name: agent_name.into(),
            client,
            post_cooldown: Duration::from_secs(config.post_cooldown_secs),
            last_post: None,
            state: EngagementState::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Remaining cooldown before another post is allowed
    fn cooldown_remaining(&self) -> Option<Duration> {
        let last = self.last_post?;
        self.post_cooldown
            .checked_sub(last.elapsed())
            .filter(|d| !d.is_zero())
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(network_error)?;

        read_json(response).await
    }

    async fn post_json(&self, path: &str, body: Option<Value>) -> Result<Value> {
        tracing::debug!("POST {}", path);
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(network_error)?;

        read_json(response).await
    }
}

#[async_trait]
impl SocialPlatform for MoltbookClient {
    fn agent_name(&self) -> &str {
        &self.agent_name
    }

    fn engagement(&self) -> &EngagementState {
        &self.state
    }

    async fn get_feed(&self, query: &FeedQuery) -> Result<Vec<PostRecord>> {
        let path = if query.personalized { "/feed" } else { "/posts" };
        let mut params = vec![
            ("sort", query.sort.clone()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(community) = &query.community {
            params.push(("submolt", community.clone()));
        }

        let data = self.get_json(path, &params).await?;
        Ok(extract_list(data, &["posts", "data"]))
    }

    async fn post(&mut self, content: &str, community: &str, title: Option<&str>) -> Result<()> {
        if let Some(remaining) = self.cooldown_remaining() {
            let remaining_secs = remaining.as_secs();
            tracing::info!(
                "Post cooldown: {}m {}s remaining",
                remaining_secs / 60,
                remaining_secs % 60
            );
            return Err(AgentError::PostCooldown { remaining_secs });
        }

        let mut body = json!({ "content": content, "submolt": community });
        if let Some(title) = title {
            body["title"] = json!(title);
        }

        match self.post_json("/posts", Some(body)).await {
            Ok(_) => {
                self.last_post = Some(Instant::now());
                tracing::info!("Posted to m/{}: {}...", community, char_prefix(content, 50));
                Ok(())
            }
            Err(AgentError::PlatformRateLimited { retry_after_secs: 0 }) => {
                Err(AgentError::PlatformRateLimited {
                    retry_after_secs: DEFAULT_POST_RETRY_SECS,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn reply(&mut self, post_id: &str, content: &str) -> Result<()> {
        self.post_json(
            &format!("/posts/{}/comments", post_id),
            Some(json!({ "content": content })),
        )
        .await?;

        self.state.replied.insert(post_id.to_string());
        tracing::info!("Replied to post: {}...", char_prefix(content, 50));
        Ok(())
    }

    async fn reply_to_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<()> {
        self.post_json(
            &format!("/posts/{}/comments", post_id),
            Some(json!({ "content": content, "parent_id": comment_id })),
        )
        .await?;

        tracing::info!("Replied to comment: {}...", char_prefix(content, 50));
        Ok(())
    }

    async fn get_post_comments(&self, post_id: &str, sort: &str) -> Result<Vec<CommentRecord>> {
        let data = self
            .get_json(
                &format!("/posts/{}/comments", post_id),
                &[("sort", sort.to_string())],
            )
            .await?;

        Ok(extract_list(data, &["comments", "data"]))
    }

    async fn upvote(&mut self, post_id: &str) -> Result<()> {
        self.post_json(&format!("/posts/{}/upvote", post_id), None)
            .await?;

        self.state.voted.insert(post_id.to_string());
        tracing::info!("Upvoted post {}...", char_prefix(post_id, 8));
        Ok(())
    }

    async fn get_profile(&self, author_name: &str) -> Result<Option<ProfileRecord>> {
        let data = match self
            .get_json("/agents/profile", &[("name", author_name.to_string())])
            .await
        {
            Ok(data) => data,
            Err(AgentError::Platform { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        match data.get("agent") {
            Some(Value::Null) | None => Ok(None),
            Some(agent) => serde_json::from_value(agent.clone())
                .map(Some)
                .map_err(|e| AgentError::Parse(format!("Invalid profile: {}", e))),
        }
    }

    async fn semantic_search(
        &self,
        query: &str,
        kind: &str,
        limit: usize,
    ) -> Result<Vec<PostRecord>> {
        let data = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", kind.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(extract_list(data, &["results", "data"]))
    }

    async fn subscribe(&mut self, community: &str) -> Result<()> {
        self.post_json(&format!("/submolts/{}/subscribe", community), None)
            .await?;

        self.state.subscribed.insert(community.to_string());
        tracing::info!("Subscribed to m/{}", community);
        Ok(())
    }
}

fn network_error(err: reqwest::Error) -> AgentError {
    AgentError::Network(scrub_secrets(&err.to_string()))
}

/// Turn a response into JSON, mapping failure statuses and
/// `{"success": false}` envelopes to errors
async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.map_err(network_error)?;
    let data: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = data
            .get("retry_after_seconds")
            .and_then(Value::as_u64)
            .or_else(|| {
                data.get("retry_after_minutes")
                    .and_then(Value::as_u64)
                    .map(|m| m * 60)
            })
            .unwrap_or(0);
        tracing::warn!("Platform rate limit: retry after {}s", retry_after_secs);
        return Err(AgentError::PlatformRateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let message = data
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(text);
        if let Some(hint) = data.get("hint").and_then(Value::as_str) {
            tracing::info!("Platform hint: {}", hint);
        }
        return Err(AgentError::Platform {
            status: status.as_u16(),
            message: scrub_secrets(&message),
        });
    }

    if data.get("success").and_then(Value::as_bool) == Some(false) {
        let message = data
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(AgentError::Platform {
            status: status.as_u16(),
            message: scrub_secrets(message),
        });
    }

    Ok(data)
}

/// Pull a record list out of a bare array or a `{key: [...]}` envelope
///
/// Items that do not parse are dropped; the rest of the page survives.
fn extract_list<T: DeserializeOwned>(data: Value, keys: &[&str]) -> Vec<T> {
    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}
