use serde::Serialize;

/// Process-lifetime statistics owned by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub cycle: u64,
    pub posts_made: u64,
    pub replies_made: u64,
    pub comment_replies_made: u64,
    pub semantic_discoveries: u64,
}

impl SessionCounters {
    /// True on every `interval`-th cycle
    pub fn is_checkpoint(&self, interval: u64) -> bool {
        interval > 0 && self.cycle > 0 && self.cycle % interval == 0
    }

    /// History line written at each checkpoint
    pub fn checkpoint_summary(&self) -> String {
        format!(
            "Cycle {} checkpoint - Posts: {}, Replies: {}, Comment Replies: {}, Semantic Discoveries: {}",
            self.cycle,
            self.posts_made,
            self.replies_made,
            self.comment_replies_made,
            self.semantic_discoveries
        )
    }
}
