// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{OrderId, Symbol};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable record of a completed match between a buy and a sell order.
///
/// `execution_price` always satisfies both limits (at or below the buy
/// limit, at or above the sell limit) because the maker's limit price is
/// used for execution. `matched_quantity` never exceeded either side's
/// remaining quantity at the instant of the match.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,

    /// Traded fuel/commodity symbol
    pub symbol: Symbol,

    /// Order id of the buy side of the match
    pub buy_order_id: OrderId,

    /// Order id of the sell side of the match
    pub sell_order_id: OrderId,

    /// Execution price (the resting order's limit price)
    pub execution_price: Decimal,

    /// Executed quantity
    pub matched_quantity: Decimal,

    /// Execution timestamp
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        symbol: Symbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        execution_price: Decimal,
        matched_quantity: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            buy_order_id,
            sell_order_id,
            execution_price,
            matched_quantity,
            executed_at: Utc::now(),
        }
    }

    /// Total settlement amount of the trade (price * quantity).
    ///
    /// Returns `None` if the multiplication overflows.
    pub fn notional(&self) -> Option<Decimal> {
        self.execution_price.checked_mul(self.matched_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_creation() {
        let trade = Trade::new(
            Symbol::from("GREEN_HYDROGEN"),
            OrderId::new(),
            OrderId::new(),
            Decimal::new(500, 2),
            Decimal::from(100),
        );

        assert_eq!(trade.symbol, Symbol::from("GREEN_HYDROGEN"));
        assert_eq!(trade.execution_price, Decimal::new(500, 2));
        assert_eq!(trade.matched_quantity, Decimal::from(100));
    }

    #[test]
    fn notional_is_price_times_quantity() {
        let trade = Trade::new(
            Symbol::from("AMMONIA"),
            OrderId::new(),
            OrderId::new(),
            Decimal::new(125, 2), // 1.25
            Decimal::from(40),
        );

        // 1.25 * 40 = 50.00
        assert_eq!(trade.notional(), Some(Decimal::from(50)));
    }

    #[test]
    fn notional_overflow_is_none() {
        let trade = Trade::new(
            Symbol::from("AMMONIA"),
            OrderId::new(),
            OrderId::new(),
            Decimal::MAX,
            Decimal::from(2),
        );

        assert_eq!(trade.notional(), None);
    }
}
