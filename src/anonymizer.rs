// ============================================================================
// Anonymizing Gateway
// Pseudonym issuance for the blind order book
// ============================================================================

use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::OwnerRef;

/// Pseudonym exposed in book queries and the trade feed in place of the
/// participant's real identity. Generated once at order creation and stable
/// for the order's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PublicId(String);

impl PublicId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues a fresh pseudonym per order and guarantees that nothing derivable
/// from the owner reference leaks into it. Observers of the book and trade
/// feed only ever see `PublicId`s.
///
/// Tokens are `ANON-` followed by 128 bits of UUIDv4 entropy in uppercase
/// hex, so collisions are not a practical concern for the lifetime of the
/// system.
#[derive(Debug, Default)]
pub struct AnonymizingGateway;

impl AnonymizingGateway {
    pub fn new() -> Self {
        Self
    }

    /// Assign a pseudonym for a new order. The owner reference is accepted
    /// only to pin the call site to the submission path; the token is pure
    /// randomness and carries no linkage back to it.
    pub fn assign(&self, _owner: &OwnerRef) -> PublicId {
        PublicId(format!(
            "ANON-{}",
            Uuid::new_v4().simple().to_string().to_uppercase()
        ))
    }
}
