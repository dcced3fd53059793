//! Domain modules organized as vertical slices — one per data stream the
//! engine publishes.
//!
//! Each sub-module contains:
//! - `mod.rs` — row types and pure domain logic
//! - `client.rs` — sub-client issuing the stream's queries through the cache
//! - extra pure transforms where the stream has them (`candle::join`,
//!   `ai_log::grouping`)

pub mod ai_log;
pub mod candle;
pub mod event;
pub mod feature;
pub mod signal;
