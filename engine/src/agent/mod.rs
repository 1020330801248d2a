//! Cycle Scheduler
//!
//! [`AgentCore`] runs the agent's life: an initial subscription pass, then
//! an endless `act → rest` loop. Each acting phase rolls three independent
//! gates (post, discovery, feed engagement). Failures inside a gate are
//! absorbed where they happen; anything that escapes is caught at the cycle
//! boundary and written to History, and the loop carries on.

pub mod core;
pub mod counters;
pub mod random;

pub use self::core::{AgentCore, AgentSettings};
pub use counters::SessionCounters;
pub use random::{RandomSource, SeededRandom};
