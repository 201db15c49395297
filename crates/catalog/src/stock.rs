//! Stock-delta draft arithmetic.
//!
//! A [`StockDraft`] accumulates a signed change against a fixed starting
//! stock level. The resulting stock can never go below zero: edits that
//! would cross the floor are clamped to exactly `-current_stock`.

use cuentos_core::{DomainError, DomainResult};

/// Accumulated stock change for a single product.
///
/// `current_stock` is fixed for the draft's lifetime; only `change` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDraft {
    current_stock: i64,
    change: i64,
}

impl StockDraft {
    /// Start a draft against the product's current stock level.
    pub fn new(current_stock: i64) -> DomainResult<Self> {
        if current_stock < 0 {
            return Err(DomainError::invariant("current stock cannot be negative"));
        }
        Ok(Self {
            current_stock,
            change: 0,
        })
    }

    /// Discard the accumulated change.
    pub fn reset(&mut self) {
        self.change = 0;
    }

    /// Add `delta` to the accumulated change, clamped to the zero-stock floor.
    pub fn adjust(&mut self, delta: i64) {
        self.change = self.change.saturating_add(delta);
        self.clamp();
    }

    /// Overwrite the accumulated change (quick-set shortcut), clamped to the
    /// zero-stock floor just like incremental edits.
    pub fn set_change(&mut self, amount: i64) {
        self.change = amount;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.projected() < 0 {
            self.change = -self.current_stock;
        }
    }

    pub fn current_stock(&self) -> i64 {
        self.current_stock
    }

    pub fn change(&self) -> i64 {
        self.change
    }

    /// Stock level the product would have after committing this draft.
    pub fn projected(&self) -> i64 {
        self.current_stock.saturating_add(self.change)
    }

    /// True when committing would be a no-op.
    pub fn is_noop(&self) -> bool {
        self.change == 0
    }
}
