// ============================================================================
// Exchange Errors
// Error taxonomy for order submission, cancellation, and persistence
// ============================================================================

use thiserror::Error;

use crate::domain::{OrderId, OrderStatus};
use crate::interfaces::StoreError;

/// Errors reported synchronously to callers of `submit_order` / `cancel_order`
/// and the book queries. Nothing is swallowed: every failure surfaces here.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The submission is malformed: non-positive quantity or price, a price
    /// or quantity off the configured tick/lot grid, or an unknown symbol.
    /// Nothing is created or persisted.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// The operation targets an order id the exchange has never seen.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Cancellation of an order that already reached a terminal status.
    #[error("order {0} is {1} and can no longer be cancelled")]
    OrderNotCancellable(OrderId, OrderStatus),

    /// Cancellation attempted by a participant that does not own the order.
    #[error("not authorized to act on order {0}")]
    NotAuthorized(OrderId),

    /// The atomic commit of a match (or cancellation) failed. The entire
    /// unit of work was rolled back: no trade, no quantity decrement, no
    /// status change survives. The caller may resubmit; there is no
    /// automatic retry.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The exchange configuration failed validation at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;
