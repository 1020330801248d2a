//! Engagement filter and evaluator
//!
//! Decides which feed items the agent may respond to, picks one, and asks
//! the generator whether it is worth a reply.

use crate::agent::RandomSource;
use crate::llm::TextGenerator;
use sdk::FeedItem;
use std::collections::HashSet;

/// Target selection samples from this many leading candidates
pub const SELECTION_WINDOW: usize = 5;

/// Token that marks a positive worthiness verdict
const AFFIRMATIVE: &str = "YES";

/// Keep feed items the agent may engage with, in feed order
///
/// Drops items written by the agent, items without text, and items whose
/// id is already in `engaged`.
pub fn filter_candidates(
    feed: &[FeedItem],
    agent_name: &str,
    engaged: &HashSet<String>,
) -> Vec<FeedItem> {
    feed.iter()
        .filter(|item| is_candidate(item, agent_name, engaged))
        .cloned()
        .collect()
}

pub fn is_candidate(item: &FeedItem, agent_name: &str, engaged: &HashSet<String>) -> bool {
    item.author.as_deref() != Some(agent_name)
        && !item.text.trim().is_empty()
        && !engaged.contains(&item.id)
}

/// Uniformly pick one of the first [`SELECTION_WINDOW`] candidates
pub fn select_target<'a>(
    candidates: &'a [FeedItem],
    rng: &mut dyn RandomSource,
) -> Option<&'a FeedItem> {
    let window = candidates.len().min(SELECTION_WINDOW);
    if window == 0 {
        return None;
    }
    candidates.get(rng.index(window))
}

/// Binary verdict from a yes/no model answer
pub fn parse_verdict(response: &str) -> bool {
    response.to_uppercase().contains(AFFIRMATIVE)
}

/// Ask the generator whether a post deserves engagement
///
/// A generation failure counts as "not worthy".
pub async fn evaluate(generator: &mut dyn TextGenerator, evaluation_prompt: &str) -> bool {
    match generator.generate(evaluation_prompt).await {
        Ok(response) => parse_verdict(&response),
        Err(e) => {
            tracing::warn!("Worthiness evaluation failed: {}", e);
            false
        }
    }
}
