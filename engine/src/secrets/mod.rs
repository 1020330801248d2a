//! Credential loading and secret scrubbing
//!
//! Credentials are read from the process environment after a `.env` file (if
//! any) has been loaded. The Moltbook key is mandatory; Gemini keys form the
//! rotation pool and may be absent, which only disables generation.
//!
//! Error text coming back from HTTP layers can echo request URLs, and the
//! Gemini API takes its key as a query parameter. [`scrub_secrets`] removes
//! anything that looks like a credential before the text is logged or
//! journaled.

pub mod string;

pub use string::SecretString;

use regex::Regex;
use sdk::errors::AgentError;
use std::sync::OnceLock;

/// Environment variable holding the social platform key
pub const MOLTBOOK_API_KEY: &str = "MOLTBOOK_API_KEY";

/// Environment variable holding the primary Gemini key
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Environment variable holding comma-separated backup Gemini keys
pub const GEMINI_BACKUP_KEYS: &str = "GEMINI_BACKUP_KEYS";

/// Credentials required to run the agent
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token for the social platform
    pub moltbook_api_key: SecretString,

    /// Ordered generation keys (primary first, then backups)
    pub gemini_keys: Vec<SecretString>,
}

impl Credentials {
    /// Load credentials from the environment, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::MissingCredential` when `MOLTBOOK_API_KEY` is
    /// unset or blank.
    pub fn from_env() -> Result<Self, AgentError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let moltbook_api_key = lookup(MOLTBOOK_API_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AgentError::MissingCredential(MOLTBOOK_API_KEY.to_string()))?;

        let primary = lookup(GEMINI_API_KEY).unwrap_or_default();
        let backups = lookup(GEMINI_BACKUP_KEYS).unwrap_or_default();
        let gemini_keys = parse_key_list(&format!("{},{}", primary, backups));

        if gemini_keys.is_empty() {
            tracing::warn!("No Gemini API keys configured, text generation is disabled");
        }

        Ok(Self {
            moltbook_api_key: SecretString::new(moltbook_api_key),
            gemini_keys,
        })
    }
}

/// Split a comma-separated key list, dropping blanks
pub fn parse_key_list(raw: &str) -> Vec<SecretString> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .collect()
}

static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Patterns match:
/// - Google API keys: AIza[0-9A-Za-z-_]{35}
/// - Moltbook keys: moltbook_[A-Za-z0-9_-]+
/// - Bearer tokens: Bearer\s+[^\s]{8,}
/// - Key query parameters: key=...
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"AIza[0-9A-Za-z\-_]{35}",
            r"moltbook_[A-Za-z0-9\-_]+",
            r"Bearer\s+[^\s]{8,}",
            r"([?&]key=)[^&\s)]+",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Replace anything that looks like a credential with `[REDACTED]`
pub fn scrub_secrets(text: &str) -> String {
    let mut scrubbed = text.to_string();
    for pattern in get_secret_patterns() {
        scrubbed = pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| match caps.get(1) {
                Some(prefix) => format!("{}[REDACTED]", prefix.as_str()),
                None => "[REDACTED]".to_string(),
            })
            .into_owned();
    }
    scrubbed
}
