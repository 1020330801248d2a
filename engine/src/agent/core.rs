//! Agent Core
//!
//! One cycle runs three independent gates, in order:
//!
//! 1. **Post**: write an original post for a favored community
//! 2. **Discovery**: semantic search on one expertise topic and engage with
//!    the best match
//! 3. **Feed**: pick a post from the feed, optionally research its author,
//!    check it is worth engaging, then reply, explore the thread and upvote
//!
//! Every `checkpoint_interval` cycles a counters summary goes to History.
//! The rest between cycles is the only long suspension point; short pacing
//! sleeps after platform actions keep the agent from hammering the API.

use anyhow::{Context, Result};
use chrono::Local;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{
    BehaviorConfig, CommunitiesConfig, Config, ContentConfig, IntelligenceConfig, PacingConfig,
};
use crate::engagement::{self, filter_candidates, is_candidate, select_target};
use crate::llm::TextGenerator;
use crate::memory::{char_prefix, NarrativeMemory};
use crate::platform::{FeedQuery, SocialPlatform};
use crate::prompts::{parse_post, PromptBuilder, PromptContext};
use crate::secrets::scrub_secrets;
use sdk::errors::AgentError;
use sdk::{FeedItem, ThreadComment};

use super::{RandomSource, SessionCounters};

/// Top comments examined per thread
const THREAD_COMMENT_LIMIT: usize = 3;

/// Comments must be longer than this to be worth a reply
const MIN_COMMENT_CHARS: usize = 40;

/// Characters quoted from posts and replies in Memory entries
const MEMORY_QUOTE_CHARS: usize = 40;

/// Characters of a cycle error kept in History
const ERROR_SUMMARY_CHARS: usize = 100;

/// Search result type used for discovery
const DISCOVERY_SEARCH_TYPE: &str = "posts";

/// Sort order used when exploring a thread
const THREAD_SORT: &str = "top";

/// Scheduler tuning taken from the loaded configuration
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub behavior: BehaviorConfig,
    pub content: ContentConfig,
    pub communities: CommunitiesConfig,
    pub intelligence: IntelligenceConfig,
    pub pacing: PacingConfig,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            behavior: config.behavior.clone(),
            content: config.content.clone(),
            communities: config.communities.clone(),
            intelligence: config.intelligence.clone(),
            pacing: config.pacing.clone(),
        }
    }
}

/// Agent Core that owns every piece of mutable session state
pub struct AgentCore {
    settings: AgentSettings,
    prompts: PromptBuilder,
    memory: NarrativeMemory,
    generator: Box<dyn TextGenerator>,
    platform: Box<dyn SocialPlatform>,
    rng: Box<dyn RandomSource>,
    counters: SessionCounters,
}

impl AgentCore {
    pub fn new(
        settings: AgentSettings,
        prompts: PromptBuilder,
        memory: NarrativeMemory,
        generator: Box<dyn TextGenerator>,
        platform: Box<dyn SocialPlatform>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            settings,
            prompts,
            memory,
            generator,
            platform,
            rng,
            counters: SessionCounters::default(),
        }
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn memory(&self) -> &NarrativeMemory {
        &self.memory
    }

    pub fn platform(&self) -> &dyn SocialPlatform {
        self.platform.as_ref()
    }

    /// Subscribe to the leading favored communities and open the session
    /// in History
    pub async fn initialize(&mut self) {
        info!("Initializing community subscriptions...");
        let communities: Vec<String> = self
            .settings
            .communities
            .favored
            .iter()
            .take(self.settings.communities.auto_subscribe_count)
            .cloned()
            .collect();

        for community in &communities {
            if let Err(e) = self.platform.subscribe(community).await {
                warn!("Could not subscribe to m/{}: {}", community, e);
            }
            pause(self.settings.pacing.after_subscribe()).await;
        }

        self.memory.append_history(&format!(
            "Session started - Subscribed to {}",
            communities.join(", ")
        ));
    }

    /// Run one acting phase followed by the checkpoint check
    pub async fn run_cycle(&mut self) {
        self.counters.cycle += 1;
        let cycle = self.counters.cycle;
        info!("Cycle #{} | {}", cycle, Local::now().format("%H:%M:%S"));

        if let Err(e) = self.act().await {
            let message = scrub_secrets(&format!("{:#}", e));
            error!("Error in cycle {}: {}", cycle, message);
            self.memory.append_history(&format!(
                "Error encountered: {}",
                char_prefix(&message, ERROR_SUMMARY_CHARS)
            ));
        }

        if self
            .counters
            .is_checkpoint(self.settings.intelligence.checkpoint_interval)
        {
            let summary = self.counters.checkpoint_summary();
            info!("{}", summary);
            self.memory.append_history(&summary);
        }
    }

    /// Sleep a uniformly random number of seconds between the configured
    /// bounds and return how long the rest was
    pub async fn rest(&mut self) -> Duration {
        let secs = self.rng.range_inclusive(
            self.settings.behavior.min_sleep_seconds,
            self.settings.behavior.max_sleep_seconds,
        );
        let duration = Duration::from_secs(secs);
        let next = chrono::Duration::from_std(duration)
            .ok()
            .map(|d| (Local::now() + d).format("%H:%M:%S").to_string())
            .unwrap_or_default();
        info!("Resting for {}s (next cycle at {})", secs, next);

        tokio::time::sleep(duration).await;
        duration
    }

    /// `cycle → rest` forever
    pub async fn run_forever(&mut self) {
        loop {
            self.run_cycle().await;
            self.rest().await;
        }
    }

    async fn act(&mut self) -> Result<()> {
        let behavior = &self.settings.behavior;
        let (post_p, search_p, browse_p) = (
            behavior.post_probability,
            behavior.semantic_search_probability,
            behavior.browse_feed_probability,
        );

        if self.rng.chance(post_p) {
            self.generate_post().await;
            pause(self.settings.pacing.after_gate()).await;
        }

        if self.rng.chance(search_p) {
            self.discover().await;
            pause(self.settings.pacing.after_gate()).await;
        }

        if self.rng.chance(browse_p) {
            self.engage_with_feed()
                .await
                .context("Feed engagement failed")?;
        }

        Ok(())
    }

    fn excerpts(&self) -> (String, String) {
        let intelligence = &self.settings.intelligence;
        (
            self.memory.soul_excerpt(intelligence.soul_excerpt_length),
            self.memory
                .recent_memory_excerpt(intelligence.memory_excerpt_length),
        )
    }

    /// Write and publish an original post; returns whether it went out
    pub async fn generate_post(&mut self) -> bool {
        let favored = &self.settings.communities.favored;
        if favored.is_empty() {
            return false;
        }
        let community = favored[self.rng.index(favored.len())].clone();
        info!("Generating original post for m/{}...", community);

        let (soul, recent) = self.excerpts();
        let prompt = self.prompts.post_prompt(
            &community,
            PromptContext {
                soul: &soul,
                memory: &recent,
            },
        );

        let output = match self.generator.generate(&prompt).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Post generation failed: {}", e);
                return false;
            }
        };

        let draft = parse_post(&output);
        let published = if draft.body.chars().count() > self.settings.content.min_post_body_chars {
            match self
                .platform
                .post(&draft.body, &community, Some(&draft.title))
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!("Post to m/{} failed: {}", community, e);
                    false
                }
            }
        } else {
            info!("Generated post too short to publish");
            false
        };

        if published {
            self.counters.posts_made += 1;
            self.memory.append_memory(&format!(
                "Posted to m/{}: {} - {}...",
                community,
                draft.title,
                char_prefix(&draft.body, MEMORY_QUOTE_CHARS)
            ));
        } else {
            self.memory.append_memory(&format!(
                "Post to m/{} not published: {}",
                community, draft.title
            ));
        }

        pause(self.settings.pacing.after_post()).await;
        published
    }

    /// Semantic search on one expertise topic and engage with the best match
    pub async fn discover(&mut self) {
        let expertise = &self.prompts.persona().expertise;
        if expertise.is_empty() {
            debug!("No expertise topics, skipping discovery");
            return;
        }
        let topic = expertise[self.rng.index(expertise.len())].clone();
        info!("Semantic search for '{}'...", topic);

        let query = format!("discussions about {} implications challenges future", topic);
        let results = match self
            .platform
            .semantic_search(&query, DISCOVERY_SEARCH_TYPE, self.settings.content.search_limit)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("Semantic search failed: {}", e);
                return;
            }
        };

        if results.is_empty() {
            info!("No results found");
            return;
        }
        info!("Found {} relevant post(s)", results.len());

        let threshold = self.settings.content.similarity_threshold;
        let Some(target) = results
            .into_iter()
            .map(FeedItem::from)
            .find(|item| item.similarity.unwrap_or(0.0) > threshold)
        else {
            info!("No high-relevance matches found");
            return;
        };

        info!(
            "Best match ({:.1}% similarity): '{}...' by @{}",
            target.similarity.unwrap_or(0.0) * 100.0,
            char_prefix(&target.text, 60),
            target.author_label()
        );

        let engagement = self.platform.engagement();
        if engagement.has_replied(&target.id) {
            info!("Already engaged with this post");
            return;
        }
        self.counters.semantic_discoveries += 1;

        if !is_candidate(&target, self.platform.agent_name(), &engagement.replied) {
            info!("Discovered post is not eligible for engagement");
            return;
        }

        if self.is_worthy(&target.text).await {
            self.engage_with_post(&target).await;
        }
    }

    /// Pick a post from the feed and engage with it if it is worthy
    ///
    /// A failed feed fetch is returned to the cycle boundary.
    pub async fn engage_with_feed(&mut self) -> std::result::Result<(), AgentError> {
        info!("Analyzing feed for engagement opportunities...");
        let query = FeedQuery {
            sort: self.settings.content.feed_sort.clone(),
            limit: self.settings.content.feed_limit,
            community: None,
            personalized: self.platform.engagement().has_subscriptions(),
        };

        let feed: Vec<FeedItem> = self
            .platform
            .get_feed(&query)
            .await?
            .into_iter()
            .map(FeedItem::from)
            .collect();

        if feed.is_empty() {
            info!("Feed is empty or unavailable");
            return Ok(());
        }

        let candidates = filter_candidates(
            &feed,
            self.platform.agent_name(),
            &self.platform.engagement().replied,
        );
        let Some(target) = select_target(&candidates, self.rng.as_mut()).cloned() else {
            info!("No eligible posts in feed");
            return Ok(());
        };

        info!(
            "Analyzing: '{}...' by @{}",
            char_prefix(&target.text, 60),
            target.author_label()
        );

        if self
            .rng
            .chance(self.settings.behavior.author_research_probability)
        {
            if let Some(author) = target.author.as_deref() {
                self.research_author(author).await;
            }
        }

        if self.is_worthy(&target.text).await {
            self.engage_with_post(&target).await;
        }

        Ok(())
    }

    async fn research_author(&self, author: &str) {
        match self.platform.get_profile(author).await {
            Ok(Some(profile)) => info!(
                "Author karma: {} | Posts: {}",
                profile.karma,
                profile.recent_posts.len()
            ),
            Ok(None) => debug!("No profile found for @{}", author),
            Err(e) => warn!("Author research failed for @{}: {}", author, e),
        }
    }

    async fn is_worthy(&mut self, text: &str) -> bool {
        let prompt = self.prompts.evaluation_prompt(text);
        engagement::evaluate(self.generator.as_mut(), &prompt).await
    }

    /// Reply, explore the thread, and upvote, each behind its own gate
    pub async fn engage_with_post(&mut self, post: &FeedItem) {
        if self.rng.chance(self.settings.behavior.reply_probability) {
            info!("Post deemed worthy of engagement");
            self.reply_to_post(post).await;
        }

        if self
            .rng
            .chance(self.settings.behavior.thread_explore_probability)
        {
            self.explore_thread(post).await;
        }

        if !self.platform.engagement().has_voted(&post.id)
            && self.rng.chance(self.settings.behavior.vote_probability)
        {
            if let Err(e) = self.platform.upvote(&post.id).await {
                warn!("Upvote failed: {}", e);
            }
            pause(self.settings.pacing.after_vote()).await;
        }
    }

    async fn reply_to_post(&mut self, post: &FeedItem) {
        let (soul, recent) = self.excerpts();
        let prompt = self.prompts.reply_prompt(
            &post.text,
            PromptContext {
                soul: &soul,
                memory: &recent,
            },
        );

        let Some(reply) = self.generate_reply(&prompt).await else {
            return;
        };

        match self.platform.reply(&post.id, &reply).await {
            Ok(()) => {
                self.counters.replies_made += 1;
                self.memory.append_memory(&format!(
                    "Engaged with @{} on: {}... | My reply: {}...",
                    post.author_label(),
                    char_prefix(&post.text, MEMORY_QUOTE_CHARS),
                    char_prefix(&reply, MEMORY_QUOTE_CHARS)
                ));
            }
            Err(e) => warn!("Reply failed: {}", e),
        }
        pause(self.settings.pacing.after_reply()).await;
    }

    /// Reply to at most one of the post's top comments
    async fn explore_thread(&mut self, post: &FeedItem) {
        info!("Exploring comment thread...");
        let comments = match self.platform.get_post_comments(&post.id, THREAD_SORT).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!("Error engaging with comment thread: {}", e);
                return;
            }
        };

        if comments.is_empty() {
            return;
        }
        info!("Found {} comment(s)", comments.len());

        let agent_name = self.platform.agent_name().to_string();
        let top: Vec<ThreadComment> = comments
            .into_iter()
            .take(THREAD_COMMENT_LIMIT)
            .map(ThreadComment::from)
            .collect();

        for comment in top {
            if comment.text.is_empty() || comment.author.as_deref() == Some(agent_name.as_str()) {
                continue;
            }

            if !self
                .rng
                .chance(self.settings.behavior.comment_consider_probability)
            {
                continue;
            }
            info!(
                "Analyzing comment by @{}: '{}...'",
                comment.author_label(),
                char_prefix(&comment.text, 50)
            );

            if comment.text.chars().count() <= MIN_COMMENT_CHARS
                || !self
                    .rng
                    .chance(self.settings.behavior.comment_engage_probability)
            {
                continue;
            }
            info!("Comment worthy of response");

            let (soul, recent) = self.excerpts();
            let prompt = self.prompts.comment_reply_prompt(
                &post.text,
                &comment.text,
                PromptContext {
                    soul: &soul,
                    memory: &recent,
                },
            );

            let Some(reply) = self.generate_reply(&prompt).await else {
                continue;
            };

            match self
                .platform
                .reply_to_comment(&post.id, &comment.id, &reply)
                .await
            {
                Ok(()) => {
                    self.counters.comment_replies_made += 1;
                    self.memory.append_memory(&format!(
                        "Replied to @{}'s comment on @{}'s post: {}...",
                        comment.author_label(),
                        post.author_label(),
                        char_prefix(&reply, MEMORY_QUOTE_CHARS)
                    ));
                    info!("Replied to comment in thread");
                    pause(self.settings.pacing.after_reply()).await;
                    break;
                }
                Err(e) => warn!("Reply to comment failed: {}", e),
            }
        }
    }

    /// Generate reply text, discarding failures and too-short output
    async fn generate_reply(&mut self, prompt: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(text) if text.chars().count() > self.settings.content.min_reply_chars => Some(text),
            Ok(_) => {
                info!("Generated reply too short, skipping");
                None
            }
            Err(e) => {
                warn!("Reply generation failed: {}", e);
                None
            }
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
