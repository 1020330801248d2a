//! Configuration management
//!
//! This module handles loading, validation, and management of the agent
//! configuration. Configuration is stored in TOML format at
//! ~/.molt-agent/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory, persona file
//! - **llm**: Generation endpoint, model and key-rotation backoff
//! - **platform**: Social platform endpoint and post cooldown
//! - **behavior**: Gate probabilities and the inter-cycle rest window
//! - **content**: Length bands, feed paging, relevance thresholds
//! - **communities**: Favored communities and auto-subscription
//! - **intelligence**: Journal files, excerpt lengths, checkpoint interval
//! - **pacing**: Fixed throttling delays after platform actions
//!
//! Every section except `core` may be omitted, in which case the
//! built-in defaults apply.
//!
//! # Path Expansion
//!
//! `~` is expanded to the user's home directory for every configured path,
//! and journal file paths that are relative resolve against `core.data_dir`.
//! The data directory is created if it doesn't exist.
//!
//! # Examples
//!
//! ```no_run
//! use molt_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Data dir: {:?}", config.core.data_dir);
//! println!("Post probability: {}", config.behavior.post_probability);
//! # Ok(())
//! # }
//! ```

pub mod persona;

pub use persona::Persona;

use sdk::errors::AgentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core agent settings
    pub core: CoreConfig,

    /// Generation client configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Social platform client configuration
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Gate probabilities and rest window
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Content length bands and feed settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Community preferences
    #[serde(default)]
    pub communities: CommunitiesConfig,

    /// Narrative memory configuration
    #[serde(default)]
    pub intelligence: IntelligenceConfig,

    /// Throttling delays after platform actions
    #[serde(default)]
    pub pacing: PacingConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Persona definition file (supports ~ expansion)
    #[serde(default = "default_persona_file")]
    pub persona_file: PathBuf,
}

/// Generation client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL for the Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature passed to every generation call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Output token cap passed to every generation call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Wait after rotating to the next key on a rate-limit error
    #[serde(default = "default_rotation_backoff_ms")]
    pub rotation_backoff_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    // Note: API keys come from the environment, not from config
}

/// Social platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL for the Moltbook API
    #[serde(default = "default_platform_base_url")]
    pub base_url: String,

    /// Minimum time between two successful posts
    #[serde(default = "default_post_cooldown")]
    pub post_cooldown_secs: u64,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Gate probabilities and rest window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default = "default_post_probability")]
    pub post_probability: f64,

    #[serde(default = "default_browse_feed_probability")]
    pub browse_feed_probability: f64,

    #[serde(default = "default_reply_probability")]
    pub reply_probability: f64,

    #[serde(default = "default_vote_probability")]
    pub vote_probability: f64,

    #[serde(default = "default_author_research_probability")]
    pub author_research_probability: f64,

    #[serde(default = "default_semantic_search_probability")]
    pub semantic_search_probability: f64,

    /// Chance of exploring the comment thread after engaging a post
    #[serde(default = "default_thread_explore_probability")]
    pub thread_explore_probability: f64,

    /// Chance of looking at each top comment at all
    #[serde(default = "default_comment_consider_probability")]
    pub comment_consider_probability: f64,

    /// Chance of replying to a comment that was looked at
    #[serde(default = "default_comment_engage_probability")]
    pub comment_engage_probability: f64,

    #[serde(default = "default_min_sleep")]
    pub min_sleep_seconds: u64,

    #[serde(default = "default_max_sleep")]
    pub max_sleep_seconds: u64,
}

/// Content length bands and feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_post_min_chars")]
    pub post_min_chars: usize,

    #[serde(default = "default_post_max_chars")]
    pub post_max_chars: usize,

    #[serde(default = "default_reply_min_chars")]
    pub reply_min_chars: usize,

    #[serde(default = "default_reply_max_chars")]
    pub reply_max_chars: usize,

    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,

    #[serde(default = "default_feed_sort")]
    pub feed_sort: String,

    /// Generated post bodies must be longer than this to be published
    #[serde(default = "default_min_post_body_chars")]
    pub min_post_body_chars: usize,

    /// Generated replies must be longer than this to be sent
    #[serde(default = "default_min_reply_chars")]
    pub min_reply_chars: usize,

    /// Semantic search results must score above this
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

/// Community preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitiesConfig {
    /// Communities the agent posts to and subscribes to
    #[serde(default = "default_favored")]
    pub favored: Vec<String>,

    /// How many of the favored communities to subscribe to at startup
    #[serde(default = "default_auto_subscribe_count")]
    pub auto_subscribe_count: usize,
}

/// Narrative memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    #[serde(default = "default_excerpt_length")]
    pub memory_excerpt_length: usize,

    #[serde(default = "default_excerpt_length")]
    pub soul_excerpt_length: usize,

    /// Append a counters summary to History every N cycles
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,

    #[serde(default = "default_memory_file")]
    pub memory_file: PathBuf,

    #[serde(default = "default_soul_file")]
    pub soul_file: PathBuf,

    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

/// Throttling delays after platform actions (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_two")]
    pub after_post_secs: u64,

    #[serde(default = "default_two")]
    pub after_reply_secs: u64,

    #[serde(default = "default_one")]
    pub after_vote_secs: u64,

    #[serde(default = "default_one")]
    pub after_subscribe_secs: u64,

    /// Delay after the post and discovery gates
    #[serde(default = "default_two")]
    pub after_gate_secs: u64,
}

impl PacingConfig {
    /// No delays at all, for tests and smoke runs
    pub fn none() -> Self {
        Self {
            after_post_secs: 0,
            after_reply_secs: 0,
            after_vote_secs: 0,
            after_subscribe_secs: 0,
            after_gate_secs: 0,
        }
    }

    pub fn after_post(&self) -> Duration {
        Duration::from_secs(self.after_post_secs)
    }

    pub fn after_reply(&self) -> Duration {
        Duration::from_secs(self.after_reply_secs)
    }

    pub fn after_vote(&self) -> Duration {
        Duration::from_secs(self.after_vote_secs)
    }

    pub fn after_subscribe(&self) -> Duration {
        Duration::from_secs(self.after_subscribe_secs)
    }

    pub fn after_gate(&self) -> Duration {
        Duration::from_secs(self.after_gate_secs)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.molt-agent")
}

fn default_persona_file() -> PathBuf {
    PathBuf::from("~/.molt-agent/persona.toml")
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_rotation_backoff_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_platform_base_url() -> String {
    "https://www.moltbook.com/api/v1".to_string()
}

fn default_post_cooldown() -> u64 {
    1800
}

fn default_post_probability() -> f64 {
    0.15
}

fn default_browse_feed_probability() -> f64 {
    1.0
}

fn default_reply_probability() -> f64 {
    0.6
}

fn default_vote_probability() -> f64 {
    0.8
}

fn default_author_research_probability() -> f64 {
    0.3
}

fn default_semantic_search_probability() -> f64 {
    0.25
}

fn default_thread_explore_probability() -> f64 {
    0.3
}

fn default_comment_consider_probability() -> f64 {
    0.5
}

fn default_comment_engage_probability() -> f64 {
    0.6
}

fn default_min_sleep() -> u64 {
    120
}

fn default_max_sleep() -> u64 {
    300
}

fn default_post_min_chars() -> usize {
    150
}

fn default_post_max_chars() -> usize {
    280
}

fn default_reply_min_chars() -> usize {
    100
}

fn default_reply_max_chars() -> usize {
    200
}

fn default_feed_limit() -> usize {
    15
}

fn default_feed_sort() -> String {
    "hot".to_string()
}

fn default_min_post_body_chars() -> usize {
    50
}

fn default_min_reply_chars() -> usize {
    30
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_search_limit() -> usize {
    10
}

fn default_favored() -> Vec<String> {
    ["general", "introductions", "ai", "philosophy", "technology"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_auto_subscribe_count() -> usize {
    3
}

fn default_excerpt_length() -> usize {
    500
}

fn default_checkpoint_interval() -> u64 {
    10
}

fn default_memory_file() -> PathBuf {
    PathBuf::from("MEMORY.md")
}

fn default_soul_file() -> PathBuf {
    PathBuf::from("SOUL.md")
}

fn default_history_file() -> PathBuf {
    PathBuf::from("HISTORY.md")
}

fn default_one() -> u64 {
    1
}

fn default_two() -> u64 {
    2
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            persona_file: default_persona_file(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            temperature: None,
            max_output_tokens: None,
            rotation_backoff_ms: default_rotation_backoff_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_platform_base_url(),
            post_cooldown_secs: default_post_cooldown(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            post_probability: default_post_probability(),
            browse_feed_probability: default_browse_feed_probability(),
            reply_probability: default_reply_probability(),
            vote_probability: default_vote_probability(),
            author_research_probability: default_author_research_probability(),
            semantic_search_probability: default_semantic_search_probability(),
            thread_explore_probability: default_thread_explore_probability(),
            comment_consider_probability: default_comment_consider_probability(),
            comment_engage_probability: default_comment_engage_probability(),
            min_sleep_seconds: default_min_sleep(),
            max_sleep_seconds: default_max_sleep(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            post_min_chars: default_post_min_chars(),
            post_max_chars: default_post_max_chars(),
            reply_min_chars: default_reply_min_chars(),
            reply_max_chars: default_reply_max_chars(),
            feed_limit: default_feed_limit(),
            feed_sort: default_feed_sort(),
            min_post_body_chars: default_min_post_body_chars(),
            min_reply_chars: default_min_reply_chars(),
            similarity_threshold: default_similarity_threshold(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for CommunitiesConfig {
    fn default() -> Self {
        Self {
            favored: default_favored(),
            auto_subscribe_count: default_auto_subscribe_count(),
        }
    }
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            memory_excerpt_length: default_excerpt_length(),
            soul_excerpt_length: default_excerpt_length(),
            checkpoint_interval: default_checkpoint_interval(),
            memory_file: default_memory_file(),
            soul_file: default_soul_file(),
            history_file: default_history_file(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_post_secs: default_two(),
            after_reply_secs: default_two(),
            after_vote_secs: default_one(),
            after_subscribe_secs: default_one(),
            after_gate_secs: default_two(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            llm: LLMConfig::default(),
            platform: PlatformConfig::default(),
            behavior: BehaviorConfig::default(),
            content: ContentConfig::default(),
            communities: CommunitiesConfig::default(),
            intelligence: IntelligenceConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.molt-agent/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (probabilities, bands, intervals, paths)
    pub fn load_or_create() -> Result<Self, AgentError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, AgentError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, AgentError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| AgentError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, AgentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AgentError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| AgentError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| AgentError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.molt-agent/config.toml)
    fn default_config_path() -> Result<PathBuf, AgentError> {
        let home = dirs::home_dir()
            .ok_or_else(|| AgentError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".molt-agent").join("config.toml"))
    }

    /// Absolute path of the Memory journal
    pub fn memory_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.intelligence.memory_file)
    }

    /// Absolute path of the Soul document
    pub fn soul_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.intelligence.soul_file)
    }

    /// Absolute path of the History journal
    pub fn history_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.intelligence.history_file)
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level, probabilities, length bands and intervals
    /// - Expands ~ in paths
    /// - Creates the data directory if it doesn't exist
    pub fn validate_and_process(&mut self) -> Result<(), AgentError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(AgentError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        let b = &self.behavior;
        let probabilities = [
            ("post_probability", b.post_probability),
            ("browse_feed_probability", b.browse_feed_probability),
            ("reply_probability", b.reply_probability),
            ("vote_probability", b.vote_probability),
            ("author_research_probability", b.author_research_probability),
            ("semantic_search_probability", b.semantic_search_probability),
            ("thread_explore_probability", b.thread_explore_probability),
            ("comment_consider_probability", b.comment_consider_probability),
            ("comment_engage_probability", b.comment_engage_probability),
            ("similarity_threshold", self.content.similarity_threshold),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::Config(format!(
                    "{} must be between 0.0 and 1.0",
                    name
                )));
            }
        }

        if b.min_sleep_seconds > b.max_sleep_seconds {
            return Err(AgentError::Config(
                "min_sleep_seconds must not exceed max_sleep_seconds".to_string(),
            ));
        }

        let c = &self.content;
        if c.post_min_chars > c.post_max_chars {
            return Err(AgentError::Config(
                "post_min_chars must not exceed post_max_chars".to_string(),
            ));
        }
        if c.reply_min_chars > c.reply_max_chars {
            return Err(AgentError::Config(
                "reply_min_chars must not exceed reply_max_chars".to_string(),
            ));
        }

        if self.intelligence.checkpoint_interval == 0 {
            return Err(AgentError::Config(
                "checkpoint_interval must be at least 1".to_string(),
            ));
        }

        if self.intelligence.memory_excerpt_length == 0 {
            return Err(AgentError::Config(
                "memory_excerpt_length must be at least 1".to_string(),
            ));
        }

        if self.communities.favored.is_empty() {
            return Err(AgentError::Config(
                "communities.favored must list at least one community".to_string(),
            ));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        self.core.persona_file = expand_path(&self.core.persona_file)?;
        self.intelligence.memory_file = expand_path(&self.intelligence.memory_file)?;
        self.intelligence.soul_file = expand_path(&self.intelligence.soul_file)?;
        self.intelligence.history_file = expand_path(&self.intelligence.history_file)?;

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                AgentError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, AgentError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| AgentError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AgentError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| AgentError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
