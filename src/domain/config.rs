// ============================================================================
// Exchange Configuration
// Symbol universe and per-symbol trading parameters
// ============================================================================

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::Symbol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Per-Symbol Configuration
// ============================================================================

/// Trading parameters for one listed symbol.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolConfig {
    /// The traded fuel/commodity symbol (e.g. "GREEN_HYDROGEN")
    pub symbol: Symbol,

    /// Optional: price tick size (minimum price increment).
    /// None means no tick size enforcement
    pub tick_size: Option<Decimal>,

    /// Optional: lot size (minimum quantity increment).
    /// None means no lot size enforcement
    pub lot_size: Option<Decimal>,
}

impl SymbolConfig {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size: None,
            lot_size: None,
        }
    }

    /// Builder method: set price tick size
    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = Some(tick);
        self
    }

    /// Builder method: set lot size
    pub fn with_lot_size(mut self, lot: Decimal) -> Self {
        self.lot_size = Some(lot);
        self
    }

    /// Fuel-grade preset: commodity fuel lots are quoted to the cent per
    /// unit, whole units only.
    pub fn fuel_grade(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol)
            .with_tick_size(Decimal::new(1, 2)) // 0.01 per unit
            .with_lot_size(Decimal::ONE)
    }

    fn validate(&self) -> Result<(), String> {
        if self.symbol.as_str().is_empty() {
            return Err("symbol cannot be empty".to_string());
        }
        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err(format!("tick size for {} must be positive", self.symbol));
            }
        }
        if let Some(lot) = self.lot_size {
            if lot <= Decimal::ZERO {
                return Err(format!("lot size for {} must be positive", self.symbol));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Exchange Configuration
// ============================================================================

/// Complete configuration for an exchange instance: the fixed symbol
/// universe plus matching policy toggles. Submissions for symbols outside
/// the universe are rejected as invalid.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExchangeConfig {
    pub symbols: Vec<SymbolConfig>,

    /// When set, an incoming order skips resting orders from the same
    /// participant and keeps matching against the rest of the queue.
    /// Off by default: the marketplace historically allowed participants
    /// to cross their own orders.
    pub prevent_self_match: bool,
}

impl ExchangeConfig {
    pub fn new(symbols: Vec<SymbolConfig>) -> Self {
        Self {
            symbols,
            prevent_self_match: false,
        }
    }

    /// Builder method: enable self-match prevention
    pub fn with_self_match_prevention(mut self) -> Self {
        self.prevent_self_match = true;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.symbols.is_empty() {
            return Err("at least one symbol must be configured".to_string());
        }
        let mut seen = HashSet::new();
        for config in &self.symbols {
            config.validate()?;
            if !seen.insert(&config.symbol) {
                return Err(format!("symbol {} configured twice", config.symbol));
            }
        }
        Ok(())
    }
}
