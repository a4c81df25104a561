// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::anonymizer::PublicId;
use crate::errors::{ExchangeError, ExchangeResult};

use super::{Order, OrderId, Side, Symbol};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// All resting orders at one price, in strict arrival order. The front of
/// the queue is the oldest order, so FIFO iteration is exactly the time
/// tie-break of price-time priority.
#[derive(Debug)]
pub struct PriceLevel {
    price: Decimal,
    orders: VecDeque<Order>,
    total_quantity: Decimal,
}

impl PriceLevel {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Decimal::ZERO,
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in time priority (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    fn push_back(&mut self, order: Order) {
        self.total_quantity += order.remaining_quantity();
        self.orders.push_back(order);
    }

    fn remove_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| &o.id == order_id)?;
        let order = self.orders.remove(pos)?;
        self.total_quantity -= order.remaining_quantity();
        Some(order)
    }

    /// Apply a fill to a resting order. Returns the order if the fill
    /// exhausted it (the caller retires it); `None` for a partial fill or
    /// an unknown/refused fill.
    fn fill_order(&mut self, order_id: &OrderId, quantity: Decimal) -> Option<Order> {
        let pos = self.orders.iter().position(|o| &o.id == order_id)?;
        let order = self.orders.get_mut(pos)?;
        if !order.fill(quantity) {
            return None;
        }
        self.total_quantity -= quantity;
        if order.status().is_terminal() {
            return self.orders.remove(pos);
        }
        None
    }

    fn find(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == order_id)
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// All active (OPEN / PARTIALLY_FILLED) orders for one symbol, ordered for
/// deterministic matching.
///
/// - Bids: highest price first (`Reverse` key)
/// - Asks: lowest price first (natural key order)
/// - `index` maps order id to its side and price for O(log n) removal
///
/// The book is a plain single-writer structure: all access is serialized
/// by the owning engine's per-symbol gate.
#[derive(Debug)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Reverse<Decimal>, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    index: HashMap<OrderId, (Side, Decimal)>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add an active order to its side of the book.
    pub fn insert(&mut self, order: Order) -> ExchangeResult<()> {
        if order.remaining_quantity() <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        if order.limit_price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(
                "price must be positive".to_string(),
            ));
        }
        if !order.status().is_active() {
            return Err(ExchangeError::InvalidOrder(format!(
                "order {} is {} and cannot rest in the book",
                order.id,
                order.status()
            )));
        }
        if self.index.contains_key(&order.id) {
            return Err(ExchangeError::InvalidOrder(format!(
                "duplicate order id {}",
                order.id
            )));
        }

        let price = order.limit_price;
        self.index.insert(order.id, (order.side, price));
        match order.side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .push_back(order),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .push_back(order),
        }
        Ok(())
    }

    // ========================================================================
    // Matching Candidates
    // ========================================================================

    /// Lazy sequence of resting orders eligible to trade against an
    /// incoming order of `taker_side` at `limit_price`, in strict
    /// price-time priority:
    ///
    /// - incoming BUY: asks with `price <= limit`, cheapest first
    /// - incoming SELL: bids with `price >= limit`, highest first
    /// - within a level: oldest first
    pub fn candidates(
        &self,
        taker_side: Side,
        limit_price: Decimal,
    ) -> Box<dyn Iterator<Item = &Order> + '_> {
        match taker_side {
            Side::Buy => Box::new(
                self.asks
                    .range(..=limit_price)
                    .flat_map(|(_, level)| level.iter()),
            ),
            // Reverse(p) <= Reverse(limit) holds exactly for p >= limit,
            // and the key order walks those bids highest-first.
            Side::Sell => Box::new(
                self.bids
                    .range(..=Reverse(limit_price))
                    .flat_map(|(_, level)| level.iter()),
            ),
        }
    }

    /// Apply a planned fill to a resting order. If the fill exhausts it,
    /// the order leaves the book and is returned for retirement.
    pub(crate) fn fill_resting(&mut self, order_id: &OrderId, quantity: Decimal) -> Option<Order> {
        let (side, price) = *self.index.get(order_id)?;
        let (retired, level_empty) = match side {
            Side::Buy => {
                let level = self.bids.get_mut(&Reverse(price))?;
                (level.fill_order(order_id, quantity), level.is_empty())
            },
            Side::Sell => {
                let level = self.asks.get_mut(&price)?;
                (level.fill_order(order_id, quantity), level.is_empty())
            },
        };
        if retired.is_some() {
            self.index.remove(order_id);
        }
        if level_empty {
            match side {
                Side::Buy => self.bids.remove(&Reverse(price)),
                Side::Sell => self.asks.remove(&price),
            };
        }
        retired
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove an order from the book (cancellation path). Returns the
    /// removed order, still in its pre-removal status.
    pub(crate) fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let (side, price) = self.index.remove(order_id)?;
        match side {
            Side::Buy => {
                let level = self.bids.get_mut(&Reverse(price))?;
                let order = level.remove_order(order_id);
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
                order
            },
            Side::Sell => {
                let level = self.asks.get_mut(&price)?;
                let order = level.remove_order(order_id);
                if level.is_empty() {
                    self.asks.remove(&price);
                }
                order
            },
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(order_id)?;
        match side {
            Side::Buy => self.bids.get(&Reverse(*price))?.find(order_id),
            Side::Sell => self.asks.get(price)?.find(order_id),
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// All resting orders: bids best-to-worst, then asks best-to-worst,
    /// oldest first within a level. This is the iteration order of
    /// `list_open_orders`.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.bids
            .values()
            .flat_map(|level| level.iter())
            .chain(self.asks.values().flat_map(|level| level.iter()))
    }

    /// Aggregated depth: up to `num_levels` (price, total quantity) pairs,
    /// best first.
    pub fn depth(&self, side: Side, num_levels: usize) -> Vec<(Decimal, Decimal)> {
        let levels: Box<dyn Iterator<Item = &PriceLevel> + '_> = match side {
            Side::Buy => Box::new(self.bids.values()),
            Side::Sell => Box::new(self.asks.values()),
        };
        levels
            .take(num_levels)
            .map(|level| (level.price(), level.total_quantity()))
            .collect()
    }

    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            self.symbol.clone(),
            self.depth(Side::Buy, depth),
            self.depth(Side::Sell, depth),
        )
    }
}

// ============================================================================
// Public Views
// ============================================================================

/// The only externally visible representation of a resting order: the
/// pseudonym stands in for the participant, and no owner identity exists
/// in this type at all.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PublicOrderView {
    pub public_id: PublicId,
    pub side: Side,
    pub symbol: Symbol,
    pub limit_price: Decimal,
    pub remaining_quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for PublicOrderView {
    fn from(order: &Order) -> Self {
        Self {
            public_id: order.public_id.clone(),
            side: order.side,
            symbol: order.symbol.clone(),
            limit_price: order.limit_price,
            remaining_quantity: order.remaining_quantity(),
            created_at: order.created_at,
        }
    }
}

/// Aggregated snapshot of the book state at one instant.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    /// Bid levels (price, quantity), best first
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ask levels (price, quantity), best first
    pub asks: Vec<(Decimal, Decimal)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn with_depth(
        symbol: Symbol,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) -> Self {
        let spread = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        };
        let mid_price = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        };
        Self {
            symbol,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymizer::AnonymizingGateway;
    use crate::domain::OwnerRef;

    fn make_order(owner: &str, side: Side, price: Decimal, quantity: Decimal) -> Order {
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
            0,
        )
    }

    fn book() -> OrderBook {
        OrderBook::new(Symbol::from("GREEN_HYDROGEN"))
    }

    #[test]
    fn insert_and_query_best_prices() {
        let mut book = book();
        book.insert(make_order("a", Side::Buy, Decimal::from(4), Decimal::from(10)))
            .unwrap();
        book.insert(make_order("b", Side::Buy, Decimal::from(5), Decimal::from(10)))
            .unwrap();
        book.insert(make_order("c", Side::Sell, Decimal::from(6), Decimal::from(10)))
            .unwrap();
        book.insert(make_order("d", Side::Sell, Decimal::from(7), Decimal::from(10)))
            .unwrap();

        assert_eq!(book.best_bid(), Some(Decimal::from(5)));
        assert_eq!(book.best_ask(), Some(Decimal::from(6)));
        assert_eq!(book.order_count(), 4);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut book = book();
        let order = make_order("a", Side::Buy, Decimal::from(5), Decimal::from(10));
        let dup = order.clone();
        book.insert(order).unwrap();
        assert!(matches!(
            book.insert(dup),
            Err(ExchangeError::InvalidOrder(_))
        ));
    }

    #[test]
    fn candidates_for_buy_are_crossing_asks_cheapest_first() {
        let mut book = book();
        book.insert(make_order("a", Side::Sell, Decimal::new(510, 2), Decimal::from(80)))
            .unwrap();
        book.insert(make_order("b", Side::Sell, Decimal::new(500, 2), Decimal::from(30)))
            .unwrap();
        book.insert(make_order("c", Side::Sell, Decimal::new(530, 2), Decimal::from(10)))
            .unwrap();

        let prices: Vec<Decimal> = book
            .candidates(Side::Buy, Decimal::new(515, 2))
            .map(|o| o.limit_price)
            .collect();
        // 5.30 does not cross a 5.15 buy.
        assert_eq!(prices, vec![Decimal::new(500, 2), Decimal::new(510, 2)]);
    }

    #[test]
    fn candidates_for_sell_are_crossing_bids_highest_first() {
        let mut book = book();
        book.insert(make_order("a", Side::Buy, Decimal::new(400, 2), Decimal::from(50)))
            .unwrap();
        book.insert(make_order("b", Side::Buy, Decimal::new(450, 2), Decimal::from(50)))
            .unwrap();
        book.insert(make_order("c", Side::Buy, Decimal::new(390, 2), Decimal::from(50)))
            .unwrap();

        let prices: Vec<Decimal> = book
            .candidates(Side::Sell, Decimal::new(400, 2))
            .map(|o| o.limit_price)
            .collect();
        // 3.90 does not cross a 4.00 sell.
        assert_eq!(prices, vec![Decimal::new(450, 2), Decimal::new(400, 2)]);
    }

    #[test]
    fn candidates_at_equal_price_are_oldest_first() {
        let mut book = book();
        let first = make_order("a", Side::Sell, Decimal::from(5), Decimal::from(10));
        let second = make_order("b", Side::Sell, Decimal::from(5), Decimal::from(10));
        let first_id = first.id;
        let second_id = second.id;
        book.insert(first).unwrap();
        book.insert(second).unwrap();

        let ids: Vec<OrderId> = book
            .candidates(Side::Buy, Decimal::from(5))
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![first_id, second_id]);
    }

    #[test]
    fn candidates_is_empty_when_nothing_crosses() {
        let mut book = book();
        book.insert(make_order("a", Side::Buy, Decimal::from(4), Decimal::from(50)))
            .unwrap();
        assert_eq!(book.candidates(Side::Sell, Decimal::from(5)).count(), 0);
    }

    #[test]
    fn fill_resting_partial_keeps_order_in_book() {
        let mut book = book();
        let order = make_order("a", Side::Sell, Decimal::from(5), Decimal::from(100));
        let id = order.id;
        book.insert(order).unwrap();

        let retired = book.fill_resting(&id, Decimal::from(40));
        assert!(retired.is_none());
        let resting = book.get(&id).unwrap();
        assert_eq!(resting.remaining_quantity(), Decimal::from(60));
        assert_eq!(book.depth(Side::Sell, 1), vec![(Decimal::from(5), Decimal::from(60))]);
    }

    #[test]
    fn fill_resting_full_retires_order_and_level() {
        let mut book = book();
        let order = make_order("a", Side::Sell, Decimal::from(5), Decimal::from(100));
        let id = order.id;
        book.insert(order).unwrap();

        let retired = book.fill_resting(&id, Decimal::from(100)).unwrap();
        assert_eq!(retired.remaining_quantity(), Decimal::ZERO);
        assert!(retired.status().is_terminal());
        assert!(!book.contains(&id));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn remove_clears_empty_level() {
        let mut book = book();
        let order = make_order("a", Side::Buy, Decimal::from(5), Decimal::from(10));
        let id = order.id;
        book.insert(order).unwrap();

        let removed = book.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(book.is_empty());
        assert_eq!(book.best_bid(), None);
    }

    #[test]
    fn remove_unknown_order_is_none() {
        let mut book = book();
        assert!(book.remove(&OrderId::new()).is_none());
    }

    #[test]
    fn open_orders_iterates_bids_then_asks() {
        let mut book = book();
        book.insert(make_order("a", Side::Sell, Decimal::from(6), Decimal::from(1)))
            .unwrap();
        book.insert(make_order("b", Side::Buy, Decimal::from(4), Decimal::from(1)))
            .unwrap();
        book.insert(make_order("c", Side::Buy, Decimal::from(5), Decimal::from(1)))
            .unwrap();

        let sides: Vec<(Side, Decimal)> = book
            .open_orders()
            .map(|o| (o.side, o.limit_price))
            .collect();
        assert_eq!(
            sides,
            vec![
                (Side::Buy, Decimal::from(5)),
                (Side::Buy, Decimal::from(4)),
                (Side::Sell, Decimal::from(6)),
            ]
        );
    }

    #[test]
    fn public_view_carries_no_owner() {
        let order = make_order("hidden-owner", Side::Buy, Decimal::from(5), Decimal::from(10));
        let view = PublicOrderView::from(&order);
        let encoded = format!("{:?}", view);
        assert!(!encoded.contains("hidden-owner"));
        assert!(view.public_id.as_str().starts_with("ANON-"));
    }

    #[test]
    fn snapshot_spread_and_mid() {
        let mut book = book();
        book.insert(make_order("a", Side::Buy, Decimal::from(4), Decimal::from(10)))
            .unwrap();
        book.insert(make_order("b", Side::Sell, Decimal::from(6), Decimal::from(10)))
            .unwrap();

        let snapshot = book.snapshot(5);
        assert_eq!(snapshot.best_bid(), Some(Decimal::from(4)));
        assert_eq!(snapshot.best_ask(), Some(Decimal::from(6)));
        assert_eq!(snapshot.spread, Some(Decimal::from(2)));
        assert_eq!(snapshot.mid_price, Some(Decimal::from(5)));
    }

    #[test]
    fn empty_book_snapshot() {
        let book = book();
        let snapshot = book.snapshot(5);
        assert!(snapshot.bids.is_empty());
        assert!(snapshot.asks.is_empty());
        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.mid_price, None);
    }
}
