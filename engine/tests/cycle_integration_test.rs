//! Integration tests for the cycle scheduler
//!
//! The scheduler is driven through scripted collaborators: a platform that
//! records every call, a generator that answers by prompt kind, and a
//! random source whose gates are fully decided by the configured
//! probabilities (0.0 never fires, 1.0 always does).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use molt_engine::agent::{AgentCore, AgentSettings, RandomSource};
use molt_engine::config::{Config, LLMConfig, PacingConfig, Persona};
use molt_engine::llm::{
    CredentialPool, GeminiProvider, LLMError, ResilientGenerator, TextGenerator,
};
use molt_engine::memory::NarrativeMemory;
use molt_engine::platform::{EngagementState, FeedQuery, SocialPlatform};
use molt_engine::prompts::PromptBuilder;
use sdk::errors::AgentError;
use sdk::{CommentRecord, PostRecord, ProfileRecord};

const AGENT_NAME: &str = "Lumen";

const REPLY_TEXT: &str = "Rest cycles let an agent consolidate what it has seen before acting again.";

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

/// Every call the scheduler made against the platform
#[derive(Debug, Default)]
struct PlatformLog {
    feed_queries: Vec<FeedQuery>,
    posts: Vec<(String, String, Option<String>)>,
    replies: Vec<(String, String)>,
    comment_replies: Vec<(String, String, String)>,
    upvotes: Vec<String>,
    profile_lookups: Vec<String>,
    searches: Vec<String>,
    subscriptions: Vec<String>,
}

#[derive(Default)]
struct MockPlatform {
    state: EngagementState,
    feed: Vec<PostRecord>,
    feed_failure: Option<(u16, String)>,
    post_failure: bool,
    comments: Vec<CommentRecord>,
    search_results: Vec<PostRecord>,
    log: Arc<Mutex<PlatformLog>>,
}

impl MockPlatform {
    fn log(&self) -> Arc<Mutex<PlatformLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl SocialPlatform for MockPlatform {
    fn agent_name(&self) -> &str {
        AGENT_NAME
    }

    fn engagement(&self) -> &EngagementState {
        &self.state
    }

    async fn get_feed(&self, query: &FeedQuery) -> Result<Vec<PostRecord>, AgentError> {
        self.log.lock().unwrap().feed_queries.push(query.clone());
        match &self.feed_failure {
            Some((status, message)) => Err(AgentError::Platform {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(self.feed.clone()),
        }
    }

    async fn post(
        &mut self,
        content: &str,
        community: &str,
        title: Option<&str>,
    ) -> Result<(), AgentError> {
        if self.post_failure {
            return Err(AgentError::PostCooldown {
                remaining_secs: 600,
            });
        }
        self.log.lock().unwrap().posts.push((
            content.to_string(),
            community.to_string(),
            title.map(str::to_string),
        ));
        Ok(())
    }

    async fn reply(&mut self, post_id: &str, content: &str) -> Result<(), AgentError> {
        self.log
            .lock()
            .unwrap()
            .replies
            .push((post_id.to_string(), content.to_string()));
        self.state.replied.insert(post_id.to_string());
        Ok(())
    }

    async fn reply_to_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<(), AgentError> {
        self.log.lock().unwrap().comment_replies.push((
            post_id.to_string(),
            comment_id.to_string(),
            content.to_string(),
        ));
        Ok(())
    }

    async fn get_post_comments(
        &self,
        _post_id: &str,
        _sort: &str,
    ) -> Result<Vec<CommentRecord>, AgentError> {
        Ok(self.comments.clone())
    }

    async fn upvote(&mut self, post_id: &str) -> Result<(), AgentError> {
        self.log.lock().unwrap().upvotes.push(post_id.to_string());
        self.state.voted.insert(post_id.to_string());
        Ok(())
    }

    async fn get_profile(&self, author_name: &str) -> Result<Option<ProfileRecord>, AgentError> {
        self.log
            .lock()
            .unwrap()
            .profile_lookups
            .push(author_name.to_string());
        Ok(Some(ProfileRecord {
            name: Some(author_name.to_string()),
            karma: 10,
            recent_posts: Vec::new(),
        }))
    }

    async fn semantic_search(
        &self,
        query: &str,
        _kind: &str,
        _limit: usize,
    ) -> Result<Vec<PostRecord>, AgentError> {
        self.log.lock().unwrap().searches.push(query.to_string());
        Ok(self.search_results.clone())
    }

    async fn subscribe(&mut self, community: &str) -> Result<(), AgentError> {
        self.log
            .lock()
            .unwrap()
            .subscriptions
            .push(community.to_string());
        self.state.subscribed.insert(community.to_string());
        Ok(())
    }
}

/// Answers worthiness prompts with `verdict`, post prompts with `post`
/// (or a quota failure when `None`), and everything else with `reply`
struct RoutingGenerator {
    verdict: String,
    post: Option<String>,
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RoutingGenerator {
    fn new(verdict: &str) -> Self {
        Self {
            verdict: verdict.to_string(),
            post: None,
            reply: REPLY_TEXT.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_post(mut self, post: &str) -> Self {
        self.post = Some(post.to_string());
        self
    }
}

#[async_trait]
impl TextGenerator for RoutingGenerator {
    async fn generate(&mut self, prompt: &str) -> Result<String, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("'YES' or 'NO'") {
            Ok(self.verdict.clone())
        } else if prompt.contains("TITLE:") {
            self.post
                .clone()
                .ok_or(LLMError::QuotaExhausted { attempts: 2 })
        } else {
            Ok(self.reply.clone())
        }
    }
}

/// Every draw is 0.5 and every pick is the first element
struct FixedRandom;

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        0.5
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn range_inclusive(&mut self, min: u64, _max: u64) -> u64 {
        min
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Settings with every gate closed and no pacing delays
fn quiet_settings() -> AgentSettings {
    let mut config = Config::default();
    config.pacing = PacingConfig::none();

    let b = &mut config.behavior;
    b.post_probability = 0.0;
    b.browse_feed_probability = 0.0;
    b.reply_probability = 0.0;
    b.vote_probability = 0.0;
    b.author_research_probability = 0.0;
    b.semantic_search_probability = 0.0;
    b.thread_explore_probability = 0.0;
    b.comment_consider_probability = 0.0;
    b.comment_engage_probability = 0.0;

    AgentSettings::from_config(&config)
}

fn persona() -> Persona {
    let mut persona = Persona::named(AGENT_NAME);
    persona.expertise = vec!["agent ethics".to_string()];
    persona
}

fn memory(temp_dir: &TempDir) -> NarrativeMemory {
    NarrativeMemory::load(
        &temp_dir.path().join("MEMORY.md"),
        &temp_dir.path().join("SOUL.md"),
        &temp_dir.path().join("HISTORY.md"),
    )
    .unwrap()
}

fn agent(
    settings: AgentSettings,
    temp_dir: &TempDir,
    generator: impl TextGenerator + 'static,
    platform: MockPlatform,
) -> AgentCore {
    let prompts = PromptBuilder::from_config(persona(), &settings.content);
    AgentCore::new(
        settings,
        prompts,
        memory(temp_dir),
        Box::new(generator),
        Box::new(platform),
        Box::new(FixedRandom),
    )
}

fn post(id: &str, content: &str, author: &str) -> PostRecord {
    PostRecord::new(id, content, author)
}

fn scored(id: &str, content: &str, author: &str, similarity: f64) -> PostRecord {
    PostRecord {
        similarity: Some(similarity),
        ..PostRecord::new(id, content, author)
    }
}

fn long_comment(id: &str, author: &str) -> CommentRecord {
    CommentRecord::new(
        id,
        "Consolidation between cycles is underrated in agent design.",
        author,
    )
}

// ---------------------------------------------------------------------------
// Checkpoints and cycle errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_checkpoint_written_exactly_every_interval() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.intelligence.checkpoint_interval = 2;

    let mut agent = agent(
        settings,
        &temp_dir,
        RoutingGenerator::new("NO"),
        MockPlatform::default(),
    );

    for _ in 0..7 {
        agent.run_cycle().await;
    }

    let history = agent.memory().history_text();
    assert!(history.contains("Cycle 2 checkpoint - Posts: 0, Replies: 0"));
    assert!(history.contains("Cycle 4 checkpoint"));
    assert!(history.contains("Cycle 6 checkpoint"));
    assert!(!history.contains("Cycle 7 checkpoint"));
    assert!(!history.contains("Cycle 3 checkpoint"));
    assert_eq!(agent.memory().stats().history_entries, 3);
    assert_eq!(agent.counters().cycle, 7);
}

#[tokio::test]
async fn test_feed_failure_is_recorded_and_loop_continues() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;

    let platform = MockPlatform {
        feed_failure: Some((500, "upstream exploded".to_string())),
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;
    agent.run_cycle().await;

    let history = agent.memory().history_text();
    assert!(history.contains(
        "Error encountered: Feed engagement failed: Platform error (500): upstream exploded"
    ));
    assert_eq!(agent.counters().cycle, 2);
    assert_eq!(log.lock().unwrap().feed_queries.len(), 2);
}

#[tokio::test]
async fn test_cycle_error_summary_is_truncated() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;

    let platform = MockPlatform {
        feed_failure: Some((502, "x".repeat(300))),
        ..Default::default()
    };
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);
    agent.run_cycle().await;

    let history = agent.memory().history_text();
    let entry = history
        .lines()
        .find(|line| line.contains("Error encountered: "))
        .unwrap();
    let summary = entry.split("Error encountered: ").nth(1).unwrap();
    assert_eq!(summary.chars().count(), 100);
}

// ---------------------------------------------------------------------------
// Feed engagement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_feed_engagement_replies_and_upvotes() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.author_research_probability = 1.0;
    settings.behavior.reply_probability = 1.0;
    settings.behavior.vote_probability = 1.0;

    let platform = MockPlatform {
        feed: vec![
            post("p0", "My own musings about rest", AGENT_NAME),
            post("p1", "Agents deserve rest cycles too", "ada"),
        ],
        ..Default::default()
    };
    let log = platform.log();
    let generator = RoutingGenerator::new("YES, this is worth discussing");
    let prompts = Arc::clone(&generator.prompts);
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert!(!log.feed_queries[0].personalized);
    assert_eq!(log.feed_queries[0].sort, "hot");
    assert_eq!(log.feed_queries[0].limit, 15);
    assert_eq!(log.profile_lookups, vec!["ada".to_string()]);
    assert_eq!(log.replies, vec![("p1".to_string(), REPLY_TEXT.to_string())]);
    assert_eq!(log.upvotes, vec!["p1".to_string()]);

    assert!(prompts.lock().unwrap()[0].contains("Post: Agents deserve rest cycles too"));

    assert_eq!(agent.counters().replies_made, 1);
    assert!(agent.platform().engagement().has_replied("p1"));
    assert!(agent
        .memory()
        .memory_text()
        .contains("Engaged with @ada on: Agents deserve rest cycles too... | My reply: "));
}

#[tokio::test]
async fn test_unworthy_post_is_left_alone() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.reply_probability = 1.0;
    settings.behavior.vote_probability = 1.0;

    let platform = MockPlatform {
        feed: vec![post("p1", "gm", "ada")],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("NO"), platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert!(log.replies.is_empty());
    assert!(log.upvotes.is_empty());
    assert!(log.profile_lookups.is_empty());
    assert_eq!(agent.counters().replies_made, 0);
}

#[tokio::test]
async fn test_already_engaged_posts_are_not_targeted() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let mut platform = MockPlatform {
        feed: vec![
            post("p1", "Already answered this one", "ada"),
            post("p2", "A fresh question about memory", "grace"),
        ],
        ..Default::default()
    };
    platform.state.replied.insert("p1".to_string());
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    assert_eq!(log.lock().unwrap().replies[0].0, "p2");
}

#[tokio::test]
async fn test_vote_skipped_when_already_voted() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.vote_probability = 1.0;

    let mut platform = MockPlatform {
        feed: vec![post("p1", "Agents deserve rest cycles too", "ada")],
        ..Default::default()
    };
    platform.state.voted.insert("p1".to_string());
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    assert!(log.lock().unwrap().upvotes.is_empty());
}

#[tokio::test]
async fn test_short_reply_is_not_sent() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let platform = MockPlatform {
        feed: vec![post("p1", "Agents deserve rest cycles too", "ada")],
        ..Default::default()
    };
    let log = platform.log();
    let mut generator = RoutingGenerator::new("YES");
    generator.reply = "Agreed.".to_string();
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    assert!(log.lock().unwrap().replies.is_empty());
    assert_eq!(agent.counters().replies_made, 0);
}

// ---------------------------------------------------------------------------
// Thread exploration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_thread_exploration_skips_own_and_short_comments() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.thread_explore_probability = 1.0;
    settings.behavior.comment_consider_probability = 1.0;
    settings.behavior.comment_engage_probability = 1.0;

    let platform = MockPlatform {
        feed: vec![post("p1", "Agents deserve rest cycles too", "ada")],
        comments: vec![
            long_comment("c0", AGENT_NAME),
            CommentRecord::new("c1", "Nice", "bob"),
            long_comment("c2", "grace"),
            long_comment("c3", "dan"),
        ],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert_eq!(
        log.comment_replies,
        vec![("p1".to_string(), "c2".to_string(), REPLY_TEXT.to_string())]
    );
    assert!(log.replies.is_empty());
    assert_eq!(agent.counters().comment_replies_made, 1);
    assert!(agent
        .memory()
        .memory_text()
        .contains("Replied to @grace's comment on @ada's post: "));
}

#[tokio::test]
async fn test_thread_exploration_replies_at_most_once() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.thread_explore_probability = 1.0;
    settings.behavior.comment_consider_probability = 1.0;
    settings.behavior.comment_engage_probability = 1.0;

    let platform = MockPlatform {
        feed: vec![post("p1", "Agents deserve rest cycles too", "ada")],
        comments: vec![long_comment("c1", "grace"), long_comment("c2", "dan")],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert_eq!(log.comment_replies.len(), 1);
    assert_eq!(log.comment_replies[0].1, "c1");
}

// ---------------------------------------------------------------------------
// Posting
// ---------------------------------------------------------------------------

const POST_OUTPUT: &str = "TITLE: Sleep as a feature\n\
CONTENT: Agents that pause between cycles make better decisions because they revisit context with fresh eyes.";

#[tokio::test]
async fn test_post_gate_publishes_to_favored_community() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.post_probability = 1.0;

    let platform = MockPlatform::default();
    let log = platform.log();
    let generator = RoutingGenerator::new("NO").with_post(POST_OUTPUT);
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert_eq!(log.posts.len(), 1);
    let (body, community, title) = &log.posts[0];
    assert_eq!(community, "general");
    assert_eq!(title.as_deref(), Some("Sleep as a feature"));
    assert!(body.starts_with("Agents that pause between cycles"));

    assert_eq!(agent.counters().posts_made, 1);
    assert!(agent.memory().memory_text().contains(
        "Posted to m/general: Sleep as a feature - Agents that pause between cycles make be..."
    ));
}

#[tokio::test]
async fn test_short_post_is_not_published() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.post_probability = 1.0;

    let platform = MockPlatform::default();
    let log = platform.log();
    let generator =
        RoutingGenerator::new("NO").with_post("TITLE: Sleep as a feature\nCONTENT: Too short");
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    assert!(log.lock().unwrap().posts.is_empty());
    assert_eq!(agent.counters().posts_made, 0);
    assert!(agent
        .memory()
        .memory_text()
        .contains("Post to m/general not published: Sleep as a feature"));
}

#[tokio::test]
async fn test_rejected_post_is_noted_in_memory() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.post_probability = 1.0;

    let platform = MockPlatform {
        post_failure: true,
        ..Default::default()
    };
    let generator = RoutingGenerator::new("NO").with_post(POST_OUTPUT);
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    assert_eq!(agent.counters().posts_made, 0);
    assert!(agent
        .memory()
        .memory_text()
        .contains("Post to m/general not published: Sleep as a feature"));
    assert!(!agent.memory().history_text().contains("Error encountered"));
}

#[tokio::test]
async fn test_empty_credential_pool_degrades_to_no_actions() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.post_probability = 1.0;
    settings.behavior.browse_feed_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let generator = ResilientGenerator::new(
        GeminiProvider::new(&LLMConfig::default()).unwrap(),
        CredentialPool::new(Vec::new()),
    );
    let platform = MockPlatform {
        feed: vec![post("p1", "Agents deserve rest cycles too", "ada")],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert!(log.posts.is_empty());
    assert!(log.replies.is_empty());
    assert_eq!(agent.counters().cycle, 1);
    assert!(!agent.memory().history_text().contains("Error encountered"));
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_discovery_engages_first_match_above_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.semantic_search_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let platform = MockPlatform {
        search_results: vec![
            scored("s0", "Loosely related musing", "bob", 0.5),
            scored("s1", "What do agents owe each other?", "grace", 0.91),
            scored("s2", "Another strong match", "dan", 0.95),
        ],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert_eq!(
        log.searches,
        vec!["discussions about agent ethics implications challenges future".to_string()]
    );
    assert_eq!(log.replies[0].0, "s1");
    assert_eq!(agent.counters().semantic_discoveries, 1);
}

#[tokio::test]
async fn test_discovery_skips_already_replied_match() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.semantic_search_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let mut platform = MockPlatform {
        search_results: vec![scored("s1", "What do agents owe each other?", "grace", 0.91)],
        ..Default::default()
    };
    platform.state.replied.insert("s1".to_string());
    let log = platform.log();
    let generator = RoutingGenerator::new("YES");
    let prompts = Arc::clone(&generator.prompts);
    let mut agent = agent(settings, &temp_dir, generator, platform);

    agent.run_cycle().await;

    assert!(log.lock().unwrap().replies.is_empty());
    assert!(prompts.lock().unwrap().is_empty());
    assert_eq!(agent.counters().semantic_discoveries, 0);
}

#[tokio::test]
async fn test_discovery_without_strong_match_does_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.semantic_search_probability = 1.0;
    settings.behavior.reply_probability = 1.0;

    let platform = MockPlatform {
        search_results: vec![scored("s0", "Loosely related musing", "bob", 0.7)],
        ..Default::default()
    };
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("YES"), platform);

    agent.run_cycle().await;

    assert!(log.lock().unwrap().replies.is_empty());
    assert_eq!(agent.counters().semantic_discoveries, 0);
}

// ---------------------------------------------------------------------------
// Session start and rest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_initialize_subscribes_and_personalizes_feed() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = quiet_settings();
    settings.behavior.browse_feed_probability = 1.0;

    let platform = MockPlatform::default();
    let log = platform.log();
    let mut agent = agent(settings, &temp_dir, RoutingGenerator::new("NO"), platform);

    agent.initialize().await;
    agent.run_cycle().await;

    let log = log.lock().unwrap();
    assert_eq!(log.subscriptions, vec!["general", "introductions", "ai"]);
    assert!(log.feed_queries[0].personalized);
    assert!(agent
        .memory()
        .history_text()
        .contains("Session started - Subscribed to general, introductions, ai"));
}

#[tokio::test(start_paused = true)]
async fn test_rest_sleeps_within_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let mut agent = agent(
        quiet_settings(),
        &temp_dir,
        RoutingGenerator::new("NO"),
        MockPlatform::default(),
    );

    let started = tokio::time::Instant::now();
    let rested = agent.rest().await;

    assert_eq!(rested, Duration::from_secs(120));
    assert!(started.elapsed() >= Duration::from_secs(120));
}
