// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

use crate::anonymizer::PublicId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque reference to the submitting participant, supplied by the external
/// identity system. It never appears in any public view, trade record, or
/// log line; the `Debug` impl is redacted so derived `Debug` output on
/// containing types cannot leak it either.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OwnerRef(String);

impl OwnerRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OwnerRef(..)")
    }
}

/// Traded fuel/commodity identifier (e.g. `GREEN_HYDROGEN`, `AMMONIA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Self(symbol.to_string())
    }
}

impl From<String> for Symbol {
    fn from(symbol: String) -> Self {
        Self(symbol)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// Order Status Machine
// ============================================================================

/// Closed set of order statuses. The source of truth for which orders may
/// still trade (`is_active`) and which are frozen forever (`is_terminal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Matched,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses never transition again and are excluded from
    /// matching.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Matched | OrderStatus::Cancelled)
    }

    /// Active orders rest in the book and participate in matching.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.is_active()
    }

    /// Apply a transition, enforcing monotonicity: once terminal, an order
    /// never changes status again.
    pub fn transition(self, transition: StatusTransition) -> Result<OrderStatus, String> {
        match (self, transition) {
            (OrderStatus::Open, StatusTransition::PartialFill) => Ok(OrderStatus::PartiallyFilled),
            (OrderStatus::Open, StatusTransition::Fill) => Ok(OrderStatus::Matched),
            (OrderStatus::Open, StatusTransition::Cancel) => Ok(OrderStatus::Cancelled),

            (OrderStatus::PartiallyFilled, StatusTransition::PartialFill) => {
                Ok(OrderStatus::PartiallyFilled)
            },
            (OrderStatus::PartiallyFilled, StatusTransition::Fill) => Ok(OrderStatus::Matched),
            (OrderStatus::PartiallyFilled, StatusTransition::Cancel) => Ok(OrderStatus::Cancelled),

            _ => Err(format!(
                "invalid transition from {:?} via {:?}",
                self, transition
            )),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Matched => "MATCHED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// Valid transitions for the order status machine
#[derive(Debug, Clone, Copy)]
pub enum StatusTransition {
    PartialFill,
    Fill,
    Cancel,
}

// ============================================================================
// Order Entity
// ============================================================================

/// A single unit of trading intent. Created by the matching engine on
/// submission, mutated only through the checked `fill`/`cancel` methods,
/// and retired (excluded from matching, never deleted) once terminal.
///
/// Invariants, maintained by construction:
/// - `0 <= remaining_quantity <= original_quantity`
/// - `status == Matched` exactly when `remaining_quantity == 0`
/// - terminal orders are immutable
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    owner: OwnerRef,
    pub public_id: PublicId,
    pub side: Side,
    pub symbol: Symbol,
    pub limit_price: Decimal,
    pub original_quantity: Decimal,
    remaining_quantity: Decimal,
    status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Arrival stamp assigned under the symbol gate; strictly increasing
    /// per symbol, so it encodes time priority even when wall-clock
    /// timestamps collide.
    pub sequence: u64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        owner: OwnerRef,
        public_id: PublicId,
        side: Side,
        symbol: Symbol,
        limit_price: Decimal,
        quantity: Decimal,
        created_at: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        Self {
            id: OrderId::new(),
            owner,
            public_id,
            side,
            symbol,
            limit_price,
            original_quantity: quantity,
            remaining_quantity: quantity,
            status: OrderStatus::Open,
            created_at,
            sequence,
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Decimal {
        self.original_quantity - self.remaining_quantity
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Ownership check without exposing the reference itself.
    pub fn is_owned_by(&self, owner: &OwnerRef) -> bool {
        &self.owner == owner
    }

    /// Whether two orders were submitted by the same participant (used for
    /// optional self-match prevention).
    pub fn same_owner(&self, other: &Order) -> bool {
        self.owner == other.owner
    }

    // ========================================================================
    // Checked Mutations (crate-private: only the engine drives these)
    // ========================================================================

    /// Fill `quantity` of this order. Refuses overfills and fills on
    /// inactive orders; returns whether the fill was applied.
    pub(crate) fn fill(&mut self, quantity: Decimal) -> bool {
        if quantity <= Decimal::ZERO || quantity > self.remaining_quantity {
            return false;
        }
        let transition = if quantity == self.remaining_quantity {
            StatusTransition::Fill
        } else {
            StatusTransition::PartialFill
        };
        match self.status.transition(transition) {
            Ok(next) => {
                self.remaining_quantity -= quantity;
                self.status = next;
                true
            },
            Err(_) => false,
        }
    }

    /// Cancel this order. Returns false if it already reached a terminal
    /// status.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.status.transition(StatusTransition::Cancel) {
            Ok(next) => {
                self.status = next;
                true
            },
            Err(_) => false,
        }
    }
}
