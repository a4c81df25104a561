// ============================================================================
// Matching Algorithm Interface
// Defines the contract for pluggable matching algorithms
// ============================================================================

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::domain::{Order, OrderBook, OrderId, Side};

/// One planned execution against a resting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// The resting (maker) order to execute against
    pub maker_id: OrderId,
    /// Quantity to execute
    pub quantity: Decimal,
    /// Execution price: the maker's limit price
    pub price: Decimal,
}

/// The complete, ordered set of fills an incoming order would produce
/// against the current book. Planning is pure: nothing is mutated until the
/// whole plan has been committed as one unit, which is what lets a failed
/// commit roll back by simply not applying the plan.
#[derive(Debug, Clone, Default)]
pub struct MatchPlan {
    pub fills: SmallVec<[Fill; 4]>,
}

impl MatchPlan {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Total quantity the taker would execute under this plan.
    pub fn filled_quantity(&self) -> Decimal {
        self.fills.iter().map(|fill| fill.quantity).sum()
    }
}

/// Strategy interface for matching algorithms.
///
/// An implementation inspects the incoming (taker) order and the book's
/// crossing candidates and decides which resting orders execute, for how
/// much, and at what price. It must not mutate anything; the engine applies
/// the returned plan after the atomic commit succeeds.
pub trait MatchingAlgorithm: Send + Sync {
    /// Plan the fills for an incoming order against the opposite side.
    fn plan_fills(&self, taker: &Order, book: &OrderBook) -> MatchPlan;

    /// Algorithm name for logging/diagnostics
    fn name(&self) -> &str;

    /// Whether the taker's limit admits execution at a given book price.
    fn prices_cross(&self, taker: &Order, book_price: Decimal) -> bool {
        match taker.side {
            Side::Buy => taker.limit_price >= book_price,
            Side::Sell => taker.limit_price <= book_price,
        }
    }
}
