// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod matching_algorithm;
mod order_store;

pub use event_handler::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
pub use matching_algorithm::{Fill, MatchPlan, MatchingAlgorithm};
pub use order_store::{CommitBatch, InMemoryOrderStore, OrderStore, StoreError};
