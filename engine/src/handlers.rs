//! Command handlers for CLI operations
//!
//! This module wires the configuration, credentials and collaborators into
//! an [`AgentCore`] and implements the handlers for all CLI commands:
//! - run: initialise and loop forever
//! - cycle: initialise and run N cycles without resting
//! - stats: print narrative memory statistics
//!
//! [`report_failure`] turns a failed command into an operator hint and a
//! process exit code.

use anyhow::{Context, Result};
use serde_json::json;
use std::time::Duration;

use crate::agent::{AgentCore, AgentSettings, SeededRandom};
use crate::config::{Config, Persona};
use crate::llm::{CredentialPool, GeminiProvider, GenerationOptions, ResilientGenerator};
use crate::memory::NarrativeMemory;
use crate::platform::MoltbookClient;
use crate::prompts::PromptBuilder;
use crate::secrets::{scrub_secrets, Credentials};
use sdk::errors::{AgentError, AgentErrorExt};

/// Exit code for configuration and credential failures (`EX_CONFIG`)
pub const EXIT_CONFIG: i32 = 78;

/// Exit code for every other failure
pub const EXIT_FAILURE: i32 = 1;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Log a failed command with its hint and pick the exit code
///
/// Configuration and credential errors are not recoverable by restarting,
/// so they get their own exit code for supervisors to tell apart.
pub fn report_failure(err: &anyhow::Error) -> i32 {
    let message = scrub_secrets(&format!("{:#}", err));
    let Some(agent_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<AgentError>())
    else {
        tracing::error!("{}", message);
        return EXIT_FAILURE;
    };

    if agent_err.is_recoverable() {
        tracing::error!("{}", message);
        tracing::info!("Hint: {}", agent_err.user_hint());
        EXIT_FAILURE
    } else {
        tracing::error!("Fatal: {}", message);
        tracing::info!("Hint: {}", agent_err.user_hint());
        EXIT_CONFIG
    }
}

/// Load the narrative memory documents named by the configuration
pub fn load_memory(config: &Config) -> Result<NarrativeMemory> {
    NarrativeMemory::load(
        &config.memory_path(),
        &config.soul_path(),
        &config.history_path(),
    )
    .context("Failed to load narrative memory")
}

/// Assemble a production agent from configuration and environment
///
/// Fails on a missing persona file or a missing platform key; both are
/// fatal before the loop starts.
pub fn build_agent(config: &Config) -> Result<AgentCore> {
    let persona = Persona::load(&config.core.persona_file)?;
    let credentials = Credentials::from_env()?;
    let memory = load_memory(config)?;

    tracing::info!("Agent: {}", persona.name);
    if !persona.description.is_empty() {
        tracing::info!("Role: {}", persona.description);
    }
    if !persona.expertise.is_empty() {
        tracing::info!("Expertise: {}", persona.expertise_line());
    }
    tracing::info!("Style: {}", persona.engagement_style);

    let stats = memory.stats();
    if stats.soul_words > 0 {
        tracing::info!("Soul loaded ({} words)", stats.soul_words);
    }
    if stats.memory_words > 0 {
        tracing::info!("Memory loaded ({} words)", stats.memory_words);
    }

    let backend = GeminiProvider::new(&config.llm)
        .context("Failed to initialise the generation client")?;
    tracing::info!("{} Gemini key(s) in rotation", credentials.gemini_keys.len());
    let generator = ResilientGenerator::new(backend, CredentialPool::new(credentials.gemini_keys))
        .with_options(GenerationOptions::from_config(&config.llm))
        .with_backoff(Duration::from_millis(config.llm.rotation_backoff_ms));

    let platform = MoltbookClient::new(
        &config.platform,
        &credentials.moltbook_api_key,
        persona.name.clone(),
    )?;

    let prompts = PromptBuilder::from_config(persona, &config.content);

    Ok(AgentCore::new(
        AgentSettings::from_config(config),
        prompts,
        memory,
        Box::new(generator),
        Box::new(platform),
        Box::new(SeededRandom::from_entropy()),
    ))
}

/// Run the agent until the process is interrupted
pub async fn handle_run(config: &Config) -> Result<()> {
    let mut agent = build_agent(config)?;
    agent.initialize().await;

    tokio::select! {
        _ = agent.run_forever() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown requested");
        }
    }

    let counters = agent.counters();
    tracing::info!(
        "Stopped after {} cycle(s): {} post(s), {} repl(ies), {} comment repl(ies), {} discover(ies)",
        counters.cycle,
        counters.posts_made,
        counters.replies_made,
        counters.comment_replies_made,
        counters.semantic_discoveries
    );
    Ok(())
}

/// Run `count` cycles back to back and print the session counters
pub async fn handle_cycle(count: u64, config: &Config, format: OutputFormat) -> Result<()> {
    let mut agent = build_agent(config)?;
    agent.initialize().await;

    for _ in 0..count {
        agent.run_cycle().await;
    }

    let counters = agent.counters();
    match format {
        OutputFormat::Text => {
            println!("Cycles run:           {}", counters.cycle);
            println!("Posts made:           {}", counters.posts_made);
            println!("Replies made:         {}", counters.replies_made);
            println!("Comment replies made: {}", counters.comment_replies_made);
            println!("Semantic discoveries: {}", counters.semantic_discoveries);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(counters)?);
        }
    }

    Ok(())
}

/// Print memory, soul and history statistics
pub fn handle_stats(config: &Config, format: OutputFormat) -> Result<()> {
    let memory = load_memory(config)?;
    let stats = memory.stats();

    match format {
        OutputFormat::Text => {
            println!("Memory:  {} words ({})", stats.memory_words, config.memory_path().display());
            println!("Soul:    {} words ({})", stats.soul_words, config.soul_path().display());
            println!(
                "History: {} entries ({})",
                stats.history_entries,
                config.history_path().display()
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "stats": stats,
                "files": {
                    "memory": config.memory_path(),
                    "soul": config.soul_path(),
                    "history": config.history_path(),
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_config_failures_get_config_exit_code() {
        let err = anyhow::Error::new(AgentError::MissingCredential(
            "MOLTBOOK_API_KEY".to_string(),
        ));
        assert_eq!(report_failure(&err), EXIT_CONFIG);
    }

    #[test]
    fn test_wrapped_agent_error_is_found_in_chain() {
        let err = anyhow::Error::new(AgentError::Config("bad persona".to_string()))
            .context("Failed to build agent");
        assert_eq!(report_failure(&err), EXIT_CONFIG);

        let err = anyhow::Error::new(AgentError::Journal("disk full".to_string()))
            .context("Failed to load narrative memory");
        assert_eq!(report_failure(&err), EXIT_FAILURE);
    }

    #[test]
    fn test_foreign_errors_are_plain_failures() {
        assert_eq!(report_failure(&anyhow!("socket closed")), EXIT_FAILURE);
    }
}
