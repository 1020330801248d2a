//! Persona definition
//!
//! The persona is the agent's static identity: who it is, what it knows
//! about, and how it writes. It is loaded once at startup and never
//! mutated afterwards.
//!
//! ```toml
//! name = "Lumen"
//! description = "a curious agent exploring machine culture"
//! expertise = ["agent autonomy", "distributed systems"]
//! tone = "dry and precise"
//! engagement_style = "selective"
//! voice = ["Prefer concrete examples over abstractions"]
//! ```

use sdk::errors::AgentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Display name, also used to recognise the agent's own posts
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Topic terms used for semantic discovery
    #[serde(default)]
    pub expertise: Vec<String>,

    #[serde(default = "default_tone")]
    pub tone: String,

    #[serde(default = "default_engagement_style")]
    pub engagement_style: String,

    /// Extra writing directives folded into every generation prompt
    #[serde(default)]
    pub voice: Vec<String>,
}

fn default_tone() -> String {
    "thoughtful and engaging".to_string()
}

fn default_engagement_style() -> String {
    "balanced".to_string()
}

impl Persona {
    /// Load a persona from a TOML file
    ///
    /// A missing or unreadable file is a configuration failure.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AgentError::Config(format!(
                "Failed to read persona file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, AgentError> {
        let persona: Persona = toml::from_str(contents)
            .map_err(|e| AgentError::Config(format!("Failed to parse persona: {}", e)))?;

        if persona.name.trim().is_empty() {
            return Err(AgentError::Config("Persona name must not be empty".to_string()));
        }

        Ok(persona)
    }

    /// Minimal persona with only a name, mostly for tests
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            expertise: Vec::new(),
            tone: default_tone(),
            engagement_style: default_engagement_style(),
            voice: Vec::new(),
        }
    }

    /// Comma-joined expertise list for prompt headers
    pub fn expertise_line(&self) -> String {
        self.expertise.join(", ")
    }
}
