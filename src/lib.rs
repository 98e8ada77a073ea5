// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod leaderboard;
pub mod lexicon;
pub mod narrator;
pub mod runtime;
pub mod session;
pub mod transform;
pub mod trial;
pub mod verify;

/// Milliseconds between runtime ticks; every timed phase counts in these.
pub const TICK_RATE_MS: u64 = 100;
