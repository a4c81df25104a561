// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod exchange;
mod matching_engine;
mod price_time;

pub use exchange::Exchange;
pub use matching_engine::MatchingEngine;
pub use price_time::PriceTimePriority;
