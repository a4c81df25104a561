// ============================================================================
// Matching Engine
// Core business logic for order matching
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::anonymizer::AnonymizingGateway;
use crate::domain::{
    Order, OrderBook, OrderBookSnapshot, OrderId, OwnerRef, PublicOrderView, Side, Symbol,
    SymbolConfig, Trade,
};
use crate::errors::{ExchangeError, ExchangeResult};
use crate::interfaces::{CommitBatch, EventHandler, MatchingAlgorithm, OrderEvent, OrderStore};

/// Everything behind the per-symbol gate. Orders leave `book` only to be
/// retired into `retired`; nothing is ever physically deleted.
struct EngineState {
    book: OrderBook,
    /// Terminal (MATCHED / CANCELLED) orders, kept for audit and for
    /// reporting precise cancellation failures.
    retired: HashMap<OrderId, Order>,
    /// Execution-ordered trade feed for this symbol.
    trades: Vec<Trade>,
}

/// Matching engine for a single symbol.
///
/// All submits, cancels, and queries for the symbol serialize on one
/// exclusive lock (the single-writer discipline), so matching is
/// deterministic and every reader observes a consistent book. Engines for
/// distinct symbols share nothing mutable and run fully in parallel.
///
/// A submission is one atomic unit of work: fills are planned against the
/// book without mutating it, the resulting order states and trades are
/// committed through the `OrderStore`, and only a successful commit is
/// applied to the book. A failed commit therefore rolls back by doing
/// nothing.
pub struct MatchingEngine {
    config: SymbolConfig,
    state: Mutex<EngineState>,
    algorithm: Box<dyn MatchingAlgorithm>,
    gateway: Arc<AnonymizingGateway>,
    store: Arc<dyn OrderStore>,
    events: Arc<dyn EventHandler>,
    /// Arrival stamps for time priority; assigned under the gate.
    sequence: AtomicU64,
}

impl MatchingEngine {
    pub fn new(
        config: SymbolConfig,
        algorithm: Box<dyn MatchingAlgorithm>,
        gateway: Arc<AnonymizingGateway>,
        store: Arc<dyn OrderStore>,
        events: Arc<dyn EventHandler>,
    ) -> Self {
        let book = OrderBook::new(config.symbol.clone());
        Self {
            config,
            state: Mutex::new(EngineState {
                book,
                retired: HashMap::new(),
                trades: Vec::new(),
            }),
            algorithm,
            gateway,
            store,
            events,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.config.symbol
    }

    /// Submit a new order: validate, pseudonymize, match against the book,
    /// commit, and return the order in its post-match state.
    pub fn submit_order(
        &self,
        owner: OwnerRef,
        side: Side,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> ExchangeResult<Order> {
        if let Err(err) = self.validate(quantity, limit_price) {
            tracing::warn!(symbol = %self.config.symbol, %err, "submission rejected");
            self.events.on_event(OrderEvent::OrderRejected {
                symbol: self.config.symbol.clone(),
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let mut state = self.state.lock();

        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel);
        let public_id = self.gateway.assign(&owner);
        let mut taker = Order::new(
            owner,
            public_id,
            side,
            self.config.symbol.clone(),
            limit_price,
            quantity,
            Utc::now(),
            sequence,
        );

        let mut events = Vec::new();
        events.push(OrderEvent::OrderAccepted {
            order_id: taker.id,
            timestamp: Utc::now(),
        });

        // Plan fills without touching the book, then materialize the trades
        // and the post-match state of every touched order.
        let plan = self.algorithm.plan_fills(&taker, &state.book);
        let mut trades = Vec::with_capacity(plan.fills.len());
        let mut touched = Vec::with_capacity(plan.fills.len() + 1);
        for fill in &plan.fills {
            let maker = state
                .book
                .get(&fill.maker_id)
                .expect("planned fill references a resting order");
            let mut maker_after = maker.clone();
            let applied = maker_after.fill(fill.quantity) && taker.fill(fill.quantity);
            debug_assert!(applied, "planned fills never exceed remaining quantity");
            touched.push(maker_after);

            let (buy_order_id, sell_order_id) = match side {
                Side::Buy => (taker.id, fill.maker_id),
                Side::Sell => (fill.maker_id, taker.id),
            };
            trades.push(Trade::new(
                self.config.symbol.clone(),
                buy_order_id,
                sell_order_id,
                fill.price,
                fill.quantity,
            ));
        }
        touched.push(taker.clone());

        // The single atomic unit of work. On failure nothing has been
        // applied: no trade, no quantity decrement, no status change.
        let batch = CommitBatch {
            orders: touched,
            trades,
        };
        if let Err(err) = self.store.commit(&batch) {
            tracing::error!(
                symbol = %self.config.symbol,
                order_id = %taker.id,
                %err,
                "commit failed, match rolled back"
            );
            return Err(ExchangeError::Persistence(err));
        }
        let CommitBatch { trades, .. } = batch;

        // Commit succeeded: apply the plan to the book.
        for fill in &plan.fills {
            if let Some(retired) = state.book.fill_resting(&fill.maker_id, fill.quantity) {
                state.retired.insert(retired.id, retired);
            }
        }
        for trade in &trades {
            events.push(OrderEvent::TradeExecuted {
                trade: trade.clone(),
                timestamp: Utc::now(),
            });
        }

        if taker.status().is_active() {
            if taker.filled_quantity() > Decimal::ZERO {
                events.push(OrderEvent::OrderPartiallyFilled {
                    order_id: taker.id,
                    filled_quantity: taker.filled_quantity(),
                    remaining_quantity: taker.remaining_quantity(),
                    timestamp: Utc::now(),
                });
            }
            state
                .book
                .insert(taker.clone())
                .expect("validated order rests cleanly");
            events.push(OrderEvent::OrderRested {
                order_id: taker.id,
                price: taker.limit_price,
                quantity: taker.remaining_quantity(),
                timestamp: Utc::now(),
            });
        } else {
            state.retired.insert(taker.id, taker.clone());
            events.push(OrderEvent::OrderMatched {
                order_id: taker.id,
                total_filled: taker.filled_quantity(),
                timestamp: Utc::now(),
            });
        }
        state.trades.extend(trades);
        drop(state);

        tracing::debug!(
            symbol = %self.config.symbol,
            order_id = %taker.id,
            side = ?side,
            status = %taker.status(),
            fills = plan.fills.len(),
            algorithm = self.algorithm.name(),
            "order processed"
        );
        self.events.on_events(events);

        Ok(taker)
    }

    /// Cancel a resting order. Only the owner may cancel, and only while
    /// the order is still OPEN or PARTIALLY_FILLED.
    pub fn cancel_order(&self, order_id: OrderId, owner: &OwnerRef) -> ExchangeResult<Order> {
        let mut state = self.state.lock();

        if let Some(resting) = state.book.get(&order_id) {
            if !resting.is_owned_by(owner) {
                return Err(ExchangeError::NotAuthorized(order_id));
            }
            let mut cancelled = resting.clone();
            let applied = cancelled.cancel();
            debug_assert!(applied, "resting orders are always cancellable");

            let batch = CommitBatch {
                orders: vec![cancelled.clone()],
                trades: Vec::new(),
            };
            self.store.commit(&batch).map_err(ExchangeError::Persistence)?;

            state.book.remove(&order_id);
            state.retired.insert(order_id, cancelled.clone());
            drop(state);

            tracing::debug!(symbol = %self.config.symbol, %order_id, "order cancelled");
            self.events.on_event(OrderEvent::OrderCancelled {
                order_id,
                timestamp: Utc::now(),
            });
            return Ok(cancelled);
        }

        if let Some(retired) = state.retired.get(&order_id) {
            // Ownership first: strangers learn nothing about the order's
            // state.
            if !retired.is_owned_by(owner) {
                return Err(ExchangeError::NotAuthorized(order_id));
            }
            return Err(ExchangeError::OrderNotCancellable(
                order_id,
                retired.status(),
            ));
        }

        Err(ExchangeError::OrderNotFound(order_id))
    }

    // ========================================================================
    // Queries (join the same per-symbol gate for a consistent snapshot)
    // ========================================================================

    /// Pseudonymous views of all resting orders, bids best-first then asks
    /// best-first, oldest first within a price level.
    pub fn open_orders(&self) -> Vec<PublicOrderView> {
        self.state
            .lock()
            .book
            .open_orders()
            .map(PublicOrderView::from)
            .collect()
    }

    /// The execution-ordered trade feed, optionally bounded below by
    /// `executed_at >= since`. Settlement consumes this.
    pub fn trades_since(&self, since: Option<DateTime<Utc>>) -> Vec<Trade> {
        let state = self.state.lock();
        match since {
            None => state.trades.clone(),
            Some(since) => state
                .trades
                .iter()
                .filter(|trade| trade.executed_at >= since)
                .cloned()
                .collect(),
        }
    }

    /// Aggregated depth snapshot of the book.
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        self.state.lock().book.snapshot(depth)
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn validate(&self, quantity: Decimal, limit_price: Decimal) -> ExchangeResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        if limit_price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(
                "price must be positive".to_string(),
            ));
        }
        if let Some(tick) = self.config.tick_size {
            if !limit_price
                .checked_rem(tick)
                .is_some_and(|rem| rem.is_zero())
            {
                return Err(ExchangeError::InvalidOrder(format!(
                    "price {limit_price} is not a multiple of tick size {tick}"
                )));
            }
        }
        if let Some(lot) = self.config.lot_size {
            if !quantity.checked_rem(lot).is_some_and(|rem| rem.is_zero()) {
                return Err(ExchangeError::InvalidOrder(format!(
                    "quantity {quantity} is not a multiple of lot size {lot}"
                )));
            }
        }
        Ok(())
    }
}
