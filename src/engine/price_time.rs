// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// The classic continuous double-auction rule
// ============================================================================

use rust_decimal::Decimal;

use crate::domain::{Order, OrderBook};
use crate::interfaces::{Fill, MatchPlan, MatchingAlgorithm};

/// Price/Time Priority (FIFO) matching.
///
/// Eligible resting orders execute best price first; among equal prices the
/// oldest order executes first. The maker's limit price is the execution
/// price, so a taker willing to pay more than the resting quote gets the
/// price improvement.
///
/// # Example
/// ```text
/// Book:  5.00 @ 30 (Order A, seq=1)
///        5.10 @ 80 (Order B, seq=2)
///
/// Incoming: Buy 100 @ 5.15
/// Result: Fill 30 with A at 5.00, then 70 with B at 5.10
/// ```
pub struct PriceTimePriority {
    prevent_self_match: bool,
}

impl PriceTimePriority {
    pub fn new(prevent_self_match: bool) -> Self {
        Self { prevent_self_match }
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn plan_fills(&self, taker: &Order, book: &OrderBook) -> MatchPlan {
        let mut plan = MatchPlan::default();
        let mut remaining = taker.remaining_quantity();

        for maker in book.candidates(taker.side, taker.limit_price) {
            if remaining <= Decimal::ZERO {
                break;
            }
            // Wash-trade guard: skip own resting orders but keep walking the
            // queue, so other participants behind them still execute.
            if self.prevent_self_match && taker.same_owner(maker) {
                continue;
            }
            debug_assert!(self.prices_cross(taker, maker.limit_price));

            let quantity = remaining.min(maker.remaining_quantity());
            plan.fills.push(Fill {
                maker_id: maker.id,
                quantity,
                price: maker.limit_price,
            });
            remaining -= quantity;
        }

        plan
    }

    fn name(&self) -> &str {
        if self.prevent_self_match {
            "PriceTime-NoSelfMatch"
        } else {
            "PriceTime"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymizer::AnonymizingGateway;
    use crate::domain::{OwnerRef, Side, Symbol};
    use chrono::Utc;

    fn make_order(owner: &str, side: Side, price: Decimal, quantity: Decimal, seq: u64) -> Order {
        let owner = OwnerRef::new(owner);
        let public_id = AnonymizingGateway::new().assign(&owner);
        Order::new(
            owner,
            public_id,
            side,
            Symbol::from("GREEN_HYDROGEN"),
            price,
            quantity,
            Utc::now(),
            seq,
        )
    }

    fn book_with(orders: Vec<Order>) -> OrderBook {
        let mut book = OrderBook::new(Symbol::from("GREEN_HYDROGEN"));
        for order in orders {
            book.insert(order).unwrap();
        }
        book
    }

    #[test]
    fn fifo_order_at_equal_price() {
        let first = make_order("a", Side::Sell, Decimal::from(5), Decimal::ONE, 1);
        let second = make_order("b", Side::Sell, Decimal::from(5), Decimal::ONE, 2);
        let first_id = first.id;
        let book = book_with(vec![first, second]);

        let taker = make_order("c", Side::Buy, Decimal::from(5), Decimal::ONE, 3);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert_eq!(plan.fills.len(), 1);
        assert_eq!(plan.fills[0].maker_id, first_id);
    }

    #[test]
    fn walks_levels_best_price_first_at_maker_price() {
        let cheap = make_order("a", Side::Sell, Decimal::new(500, 2), Decimal::from(30), 1);
        let dear = make_order("b", Side::Sell, Decimal::new(510, 2), Decimal::from(80), 2);
        let cheap_id = cheap.id;
        let dear_id = dear.id;
        let book = book_with(vec![cheap, dear]);

        let taker = make_order("c", Side::Buy, Decimal::new(515, 2), Decimal::from(100), 3);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert_eq!(plan.fills.len(), 2);
        assert_eq!(plan.fills[0].maker_id, cheap_id);
        assert_eq!(plan.fills[0].quantity, Decimal::from(30));
        assert_eq!(plan.fills[0].price, Decimal::new(500, 2));
        assert_eq!(plan.fills[1].maker_id, dear_id);
        assert_eq!(plan.fills[1].quantity, Decimal::from(70));
        assert_eq!(plan.fills[1].price, Decimal::new(510, 2));
        assert_eq!(plan.filled_quantity(), Decimal::from(100));
    }

    #[test]
    fn stops_once_taker_is_exhausted() {
        let book = book_with(vec![
            make_order("a", Side::Sell, Decimal::from(5), Decimal::from(10), 1),
            make_order("b", Side::Sell, Decimal::from(5), Decimal::from(10), 2),
        ]);

        let taker = make_order("c", Side::Buy, Decimal::from(5), Decimal::from(10), 3);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert_eq!(plan.fills.len(), 1);
    }

    #[test]
    fn partial_fill_of_taker_when_book_is_thin() {
        let book = book_with(vec![make_order(
            "a",
            Side::Sell,
            Decimal::from(5),
            Decimal::from(40),
            1,
        )]);

        let taker = make_order("c", Side::Buy, Decimal::from(5), Decimal::from(100), 2);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert_eq!(plan.filled_quantity(), Decimal::from(40));
    }

    #[test]
    fn no_fills_when_prices_do_not_cross() {
        let book = book_with(vec![make_order(
            "a",
            Side::Buy,
            Decimal::new(400, 2),
            Decimal::from(50),
            1,
        )]);

        let taker = make_order("c", Side::Sell, Decimal::new(450, 2), Decimal::from(50), 2);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert!(plan.is_empty());
    }

    #[test]
    fn self_match_prevention_skips_and_continues() {
        let own = make_order("alice", Side::Sell, Decimal::from(5), Decimal::ONE, 1);
        let other = make_order("bob", Side::Sell, Decimal::from(5), Decimal::ONE, 2);
        let other_id = other.id;
        let book = book_with(vec![own, other]);

        let taker = make_order("alice", Side::Buy, Decimal::from(5), Decimal::ONE, 3);
        let plan = PriceTimePriority::new(true).plan_fills(&taker, &book);

        assert_eq!(plan.fills.len(), 1);
        assert_eq!(plan.fills[0].maker_id, other_id);
    }

    #[test]
    fn self_match_allowed_by_default() {
        let own = make_order("alice", Side::Sell, Decimal::from(5), Decimal::ONE, 1);
        let own_id = own.id;
        let book = book_with(vec![own]);

        let taker = make_order("alice", Side::Buy, Decimal::from(5), Decimal::ONE, 2);
        let plan = PriceTimePriority::new(false).plan_fills(&taker, &book);

        assert_eq!(plan.fills.len(), 1);
        assert_eq!(plan.fills[0].maker_id, own_id);
    }
}
