//! Prompt construction
//!
//! Every generation prompt starts with the same identity header (persona,
//! Soul excerpt, recent Memory) followed by a task block with an explicit
//! length band and formatting rules. Building is pure: the builder holds
//! only the persona and length bands, and callers pass in the excerpts.

mod post;

pub use post::{parse_post, PostDraft};

use crate::config::{ContentConfig, Persona};
use crate::memory::char_prefix;

/// Marker that introduces the title line in a generated post
pub const TITLE_MARKER: &str = "TITLE:";

/// Marker that introduces the body in a generated post
pub const CONTENT_MARKER: &str = "CONTENT:";

/// Characters of the original post quoted in a comment-reply prompt
const THREAD_CONTEXT_CHARS: usize = 100;

/// Inclusive character-length band for generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

/// Grounding text shared by every generation prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub soul: &'a str,
    pub memory: &'a str,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: Persona,
    post_band: LengthBand,
    reply_band: LengthBand,
}

impl PromptBuilder {
    pub fn new(persona: Persona, post_band: LengthBand, reply_band: LengthBand) -> Self {
        Self {
            persona,
            post_band,
            reply_band,
        }
    }

    pub fn from_config(persona: Persona, content: &ContentConfig) -> Self {
        Self::new(
            persona,
            LengthBand {
                min: content.post_min_chars,
                max: content.post_max_chars,
            },
            LengthBand {
                min: content.reply_min_chars,
                max: content.reply_max_chars,
            },
        )
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Original post for `community`, answered as `TITLE:` / `CONTENT:`
    pub fn post_prompt(&self, community: &str, ctx: PromptContext<'_>) -> String {
        let mut prompt = self.header(ctx);
        prompt.push_str(&format!(
            "Write ONE insightful post for the m/{community} community on Moltbook \
             (a social network for AI agents).\n\
             Draw on your expertise and on what you remember doing recently.\n"
        ));
        prompt.push_str("Requirements:\n");
        prompt.push_str(&format!(
            "- {}-{} characters for content\n",
            self.post_band.min, self.post_band.max
        ));
        prompt.push_str("- Thought-provoking and specific\n");
        prompt.push_str("- No hashtags, no emojis\n");
        self.push_voice(&mut prompt);
        prompt.push_str(&format!(
            "\nFORMAT YOUR RESPONSE EXACTLY LIKE THIS:\n\
             {TITLE_MARKER} [Short title, 3-8 words]\n\
             {CONTENT_MARKER} [Your full post content]\n"
        ));
        prompt
    }

    /// Top-level reply to a post
    pub fn reply_prompt(&self, post_content: &str, ctx: PromptContext<'_>) -> String {
        let mut prompt = self.header(ctx);
        prompt.push_str(&format!("Someone posted: '{post_content}'\n\n"));
        prompt.push_str(&format!(
            "Write a thoughtful reply ({}-{} chars).\n",
            self.reply_band.min, self.reply_band.max
        ));
        prompt.push_str("Requirements:\n");
        prompt.push_str("- Add value to the discussion\n");
        prompt.push_str("- No generic praise, be substantive\n");
        prompt.push_str("- No hashtags or emojis\n");
        self.push_voice(&mut prompt);
        prompt.push_str("\nWrite ONLY the reply, nothing else.");
        prompt
    }

    /// Reply to a comment inside a post's thread
    pub fn comment_reply_prompt(
        &self,
        post_content: &str,
        comment_content: &str,
        ctx: PromptContext<'_>,
    ) -> String {
        let mut prompt = self.header(ctx);
        prompt.push_str(&format!(
            "Original post context: '{}...'\n",
            char_prefix(post_content, THREAD_CONTEXT_CHARS)
        ));
        prompt.push_str(&format!("Someone commented: '{comment_content}'\n\n"));
        prompt.push_str(&format!(
            "Write a thoughtful reply to this comment ({}-{} chars).\n",
            self.reply_band.min, self.reply_band.max
        ));
        prompt.push_str("Requirements:\n");
        prompt.push_str("- Build on or challenge the comment's point\n");
        prompt.push_str("- Be specific and substantive\n");
        prompt.push_str("- No hashtags or emojis\n");
        self.push_voice(&mut prompt);
        prompt.push_str("\nWrite ONLY the reply, nothing else.");
        prompt
    }

    /// Yes/no framing used by the worthiness check
    pub fn evaluation_prompt(&self, post_content: &str) -> String {
        format!(
            "You are evaluating whether this post deserves thoughtful engagement:\n\n\
             Post: {post_content}\n\n\
             Is this post substantive, thought-provoking, intelligent, or worthy of discussion?\n\
             Answer with ONLY 'YES' or 'NO'."
        )
    }

    fn header(&self, ctx: PromptContext<'_>) -> String {
        let persona = &self.persona;
        let mut header = format!("You are {}", persona.name);
        if !persona.description.is_empty() {
            header.push_str(&format!(", {}", persona.description));
        }
        header.push('\n');
        if !persona.expertise.is_empty() {
            header.push_str(&format!("Your expertise: {}\n", persona.expertise_line()));
        }
        header.push_str(&format!("Your tone: {}\n\n", persona.tone));
        if !ctx.soul.is_empty() {
            header.push_str(&format!("YOUR SOUL (core directives):\n{}\n\n", ctx.soul));
        }
        header.push_str(&format!("RECENT MEMORY:\n{}\n\n", ctx.memory));
        header
    }

    fn push_voice(&self, prompt: &mut String) {
        for directive in &self.persona.voice {
            prompt.push_str(&format!("- {directive}\n"));
        }
    }
}
