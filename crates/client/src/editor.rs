//! Stock-adjustment editor for the product modal.

use thiserror::Error;

use cuentos_catalog::StockDraft;
use cuentos_core::{DomainResult, ProductId};

use crate::api::CatalogApi;

const GENERIC_STOCK_ERROR: &str = "could not update stock";

/// Why a commit did not complete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    /// The accumulated change is zero; rejected before any network call.
    #[error("stock change is zero; nothing to save")]
    NoChange,
    /// A commit is already outstanding.
    #[error("a stock update is already in flight")]
    InFlight,
    /// The server refused the update.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed.
    #[error("{0}")]
    Transport(String),
}

/// Per-modal editor accumulating a signed stock delta for one product.
///
/// Lifecycle: `open` → `adjust`/`set_change`* → `commit`. A failed commit
/// leaves the draft editable for retry; a successful one resets it.
#[derive(Debug, Clone)]
pub struct StockDeltaEditor {
    product_id: ProductId,
    draft: StockDraft,
    error: Option<String>,
    saving: bool,
}

impl StockDeltaEditor {
    /// Open the editor for a product at its current stock level.
    pub fn open(product_id: ProductId, current_stock: i64) -> DomainResult<Self> {
        Ok(Self {
            product_id,
            draft: StockDraft::new(current_stock)?,
            error: None,
            saving: false,
        })
    }

    /// Clear the draft and any prior error (modal re-open).
    pub fn reset(&mut self) {
        self.draft.reset();
        self.error = None;
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn change(&self) -> i64 {
        self.draft.change()
    }

    /// Stock level the product would have after committing.
    pub fn projected_stock(&self) -> i64 {
        self.draft.projected()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Add `delta` to the draft, clamped to the zero-stock floor.
    pub fn adjust(&mut self, delta: i64) {
        self.draft.adjust(delta);
    }

    /// Overwrite the draft (quick-set shortcut), clamped like `adjust`.
    pub fn set_change(&mut self, amount: i64) {
        self.draft.set_change(amount);
    }

    /// Commit the accumulated change as a single API call.
    ///
    /// The wire call transmits the *delta*, not the absolute new value. On
    /// success returns the new absolute stock and resets the draft; on
    /// failure records the message and leaves the draft editable for retry.
    pub async fn commit<A: CatalogApi>(&mut self, api: &A) -> Result<i64, CommitError> {
        if self.saving {
            return Err(CommitError::InFlight);
        }
        if self.draft.is_noop() {
            return Err(CommitError::NoChange);
        }

        self.saving = true;
        let result = api.update_stock(self.product_id, self.draft.change()).await;
        self.saving = false;

        match result {
            Ok(response) if response.status => {
                let new_stock = self.draft.projected();
                self.reset();
                tracing::info!(product_id = %self.product_id, new_stock, "stock updated");
                Ok(new_stock)
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_STOCK_ERROR.to_string());
                tracing::warn!(product_id = %self.product_id, %message, "stock update rejected");
                self.error = Some(message.clone());
                Err(CommitError::Rejected(message))
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(product_id = %self.product_id, %message, "stock update failed");
                self.error = Some(message.clone());
                Err(CommitError::Transport(message))
            }
        }
    }
}
