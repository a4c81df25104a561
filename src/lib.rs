// ============================================================================
// Fuel Exchange Library
// Anonymous continuous double-auction matching for fungible fuel lots
// ============================================================================

//! # Fuel Exchange
//!
//! An anonymous matching engine for fungible commodity fuel lots (hydrogen
//! grades, ammonia, biofuels, ...) using strict price-time priority — the
//! classic continuous double-auction rule.
//!
//! ## Design
//!
//! - **Blind book**: every order carries a high-entropy pseudonym; owner
//!   identity never reaches book views, trade records, events, or logs
//! - **Strict price-time priority**: best resting quote trades first, and
//!   among equal quotes the oldest order trades first, so an identical
//!   submission sequence always reproduces the identical trade list
//! - **Maker-price execution**: the resting order sets the execution price
//! - **Atomic unit of work**: each submission's fills, status changes, and
//!   trades commit through one [`interfaces::OrderStore`] call; a failed
//!   commit rolls the whole match back
//! - **Single writer per symbol**: one exclusive gate per symbol's book,
//!   full parallelism across symbols
//!
//! ## Example
//!
//! ```rust
//! use fuel_exchange::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let config = ExchangeConfig::new(vec![SymbolConfig::fuel_grade("GREEN_HYDROGEN")]);
//! let exchange = Exchange::from_config(
//!     config,
//!     Arc::new(InMemoryOrderStore::new()),
//!     Arc::new(NoOpEventHandler),
//! )
//! .unwrap();
//!
//! // A producer lists 100 units at 5.00
//! let ask = exchange
//!     .submit_order(
//!         OwnerRef::new("producer-7"),
//!         Side::Sell,
//!         Symbol::from("GREEN_HYDROGEN"),
//!         Decimal::from(100),
//!         Decimal::new(500, 2),
//!     )
//!     .unwrap();
//! assert_eq!(ask.status(), OrderStatus::Open);
//!
//! // A buyer willing to pay 5.20 executes at the maker's 5.00
//! let bid = exchange
//!     .submit_order(
//!         OwnerRef::new("buyer-3"),
//!         Side::Buy,
//!         Symbol::from("GREEN_HYDROGEN"),
//!         Decimal::from(100),
//!         Decimal::new(520, 2),
//!     )
//!     .unwrap();
//! assert_eq!(bid.status(), OrderStatus::Matched);
//!
//! let symbol = Symbol::from("GREEN_HYDROGEN");
//! let trades = exchange.list_trades(&symbol, None).unwrap();
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].execution_price, Decimal::new(500, 2));
//!
//! // The book only ever shows pseudonyms
//! assert!(exchange.list_open_orders(&symbol).unwrap().is_empty());
//! ```

pub mod anonymizer;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod interfaces;

// Re-exports for convenience
pub mod prelude {
    pub use crate::anonymizer::{AnonymizingGateway, PublicId};
    pub use crate::domain::{
        ExchangeConfig, Order, OrderBook, OrderBookSnapshot, OrderId, OrderStatus, OwnerRef,
        PublicOrderView, Side, StatusTransition, Symbol, SymbolConfig, Trade,
    };
    pub use crate::engine::{Exchange, MatchingEngine, PriceTimePriority};
    pub use crate::errors::{ExchangeError, ExchangeResult};
    pub use crate::interfaces::{
        CommitBatch, EventHandler, Fill, InMemoryOrderStore, LoggingEventHandler, MatchPlan,
        MatchingAlgorithm, NoOpEventHandler, OrderEvent, OrderStore, StoreError,
    };
}
