// ============================================================================
// Order Store Interface
// Transactional persistence seam for orders and trades
// ============================================================================

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::{Order, OrderId, Trade};

/// Commit failure reported by the persistence collaborator. The engine maps
/// it to `ExchangeError::Persistence` and applies nothing in memory.
#[derive(Debug, Clone, Error)]
#[error("commit rejected by store: {reason}")]
pub struct StoreError {
    pub reason: String,
}

impl StoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Everything one submission (or cancellation) produced, committed as a
/// single atomic unit: the post-match states of every touched order plus
/// the trades executed between them. Either all of it persists or none of
/// it does.
#[derive(Debug, Clone, Default)]
pub struct CommitBatch {
    pub orders: Vec<Order>,
    pub trades: Vec<Trade>,
}

/// Persistence seam. Durable storage is an external collaborator; the
/// engine only requires that `commit` is all-or-nothing and returns before
/// the caller observes the submission's outcome.
pub trait OrderStore: Send + Sync {
    fn commit(&self, batch: &CommitBatch) -> Result<(), StoreError>;
}

/// Reference store keeping committed state in memory. Used by the test
/// suite and available to embedders that bring their own durability.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
    trades: Mutex<Vec<Trade>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest committed state of an order, if any.
    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.lock().get(order_id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().len()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().clone()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.lock().len()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn commit(&self, batch: &CommitBatch) -> Result<(), StoreError> {
        let mut orders = self.orders.lock();
        for order in &batch.orders {
            orders.insert(order.id, order.clone());
        }
        self.trades.lock().extend(batch.trades.iter().cloned());
        Ok(())
    }
}
