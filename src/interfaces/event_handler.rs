// ============================================================================
// Event Handler Interface
// Defines the contract for observing order and trade events
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{OrderId, Symbol, Trade};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine. These carry only ids, pseudonymous
/// trade records, prices, and quantities; owner identity never appears here.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order validated and accepted for matching
    OrderAccepted {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Submission rejected before an order was created
    OrderRejected {
        symbol: Symbol,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A match executed; the trade is the settlement feed's unit
    TradeExecuted {
        trade: Trade,
        timestamp: DateTime<Utc>,
    },

    /// Incoming order partially filled during its matching pass
    OrderPartiallyFilled {
        order_id: OrderId,
        filled_quantity: Decimal,
        remaining_quantity: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Order fully matched (remaining quantity reached zero)
    OrderMatched {
        order_id: OrderId,
        total_filled: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Order rested in the book awaiting a counterparty
    OrderRested {
        order_id: OrderId,
        price: Decimal,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Order cancelled by its owner
    OrderCancelled {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing matching engine events.
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!("matching engine event: {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_handler_accepts_events() {
        let handler = NoOpEventHandler;
        handler.on_event(OrderEvent::OrderAccepted {
            order_id: OrderId::new(),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn batch_dispatch_forwards_each_event() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(AtomicUsize);
        impl EventHandler for Counting {
            fn on_event(&self, _event: OrderEvent) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let handler = Counting(AtomicUsize::new(0));
        handler.on_events(vec![
            OrderEvent::OrderAccepted {
                order_id: OrderId::new(),
                timestamp: Utc::now(),
            },
            OrderEvent::OrderCancelled {
                order_id: OrderId::new(),
                timestamp: Utc::now(),
            },
        ]);
        assert_eq!(handler.0.load(Ordering::SeqCst), 2);
    }
}
