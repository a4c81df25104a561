// ============================================================================
// Exchange
// Multi-symbol façade over per-symbol matching engines
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::anonymizer::AnonymizingGateway;
use crate::domain::{
    ExchangeConfig, Order, OrderBookSnapshot, OrderId, OwnerRef, PublicOrderView, Side, Symbol,
    Trade,
};
use crate::engine::{MatchingEngine, PriceTimePriority};
use crate::errors::{ExchangeError, ExchangeResult};
use crate::interfaces::{EventHandler, OrderStore};

/// The transport-agnostic surface collaborators integrate against.
///
/// One matching engine per configured symbol, built once from validated
/// configuration. The engine map never changes after construction, so
/// submissions for distinct symbols proceed fully in parallel while each
/// symbol keeps its single-writer discipline.
pub struct Exchange {
    engines: HashMap<Symbol, MatchingEngine>,
}

impl Exchange {
    /// Build an exchange from configuration. All engines share the
    /// anonymizing gateway, the persistence collaborator, and the event
    /// observer.
    pub fn from_config(
        config: ExchangeConfig,
        store: Arc<dyn OrderStore>,
        events: Arc<dyn EventHandler>,
    ) -> ExchangeResult<Self> {
        config.validate().map_err(ExchangeError::InvalidConfig)?;

        let gateway = Arc::new(AnonymizingGateway::new());
        let mut engines = HashMap::with_capacity(config.symbols.len());
        for symbol_config in config.symbols {
            let symbol = symbol_config.symbol.clone();
            let engine = MatchingEngine::new(
                symbol_config,
                Box::new(PriceTimePriority::new(config.prevent_self_match)),
                gateway.clone(),
                store.clone(),
                events.clone(),
            );
            engines.insert(symbol, engine);
        }

        tracing::info!(symbols = engines.len(), "exchange initialized");
        Ok(Self { engines })
    }

    /// The configured symbol universe.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.engines.keys()
    }

    fn engine(&self, symbol: &Symbol) -> ExchangeResult<&MatchingEngine> {
        self.engines
            .get(symbol)
            .ok_or_else(|| ExchangeError::InvalidOrder(format!("unknown symbol {symbol}")))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Submit a limit order. Returns the order with its assigned pseudonym
    /// and its status/remaining quantity after any immediate matching.
    pub fn submit_order(
        &self,
        owner: OwnerRef,
        side: Side,
        symbol: Symbol,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> ExchangeResult<Order> {
        self.engine(&symbol)?
            .submit_order(owner, side, quantity, limit_price)
    }

    /// Cancel an order by id. The public operation carries no symbol, so
    /// the exchange locates the engine that knows the id; UUID ids make
    /// the match unique.
    pub fn cancel_order(&self, order_id: OrderId, owner: &OwnerRef) -> ExchangeResult<Order> {
        for engine in self.engines.values() {
            match engine.cancel_order(order_id, owner) {
                Err(ExchangeError::OrderNotFound(_)) => continue,
                outcome => return outcome,
            }
        }
        Err(ExchangeError::OrderNotFound(order_id))
    }

    /// Pseudonymous views of a symbol's resting orders.
    pub fn list_open_orders(&self, symbol: &Symbol) -> ExchangeResult<Vec<PublicOrderView>> {
        Ok(self.engine(symbol)?.open_orders())
    }

    /// A symbol's trade feed, optionally bounded by `executed_at >= since`.
    /// Settlement (an external collaborator) consumes this.
    pub fn list_trades(
        &self,
        symbol: &Symbol,
        since: Option<DateTime<Utc>>,
    ) -> ExchangeResult<Vec<Trade>> {
        Ok(self.engine(symbol)?.trades_since(since))
    }

    /// Aggregated depth snapshot of a symbol's book.
    pub fn snapshot(&self, symbol: &Symbol, depth: usize) -> ExchangeResult<OrderBookSnapshot> {
        Ok(self.engine(symbol)?.snapshot(depth))
    }
}
