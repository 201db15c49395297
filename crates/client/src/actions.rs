//! Orchestration between the editors, the remote API and the list store.
//!
//! These are the operations the admin screen's handlers call: they validate
//! input, talk to the API, and on success push the result into the store so
//! the visible list stays in sync without a refetch.

use thiserror::Error;

use cuentos_catalog::{NewProduct, Product, ProductPatch};
use cuentos_core::{DomainError, ProductId};

use crate::api::{ApiError, CatalogApi};
use crate::editor::{CommitError, StockDeltaEditor};
use crate::store::ProductListStore;

const GENERIC_SAVE_ERROR: &str = "could not save the product";
const NOT_FOUND_ERROR: &str = "product not found";

/// Failure of a screen-level action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Rejected locally, before any network call.
    #[error(transparent)]
    Validation(#[from] DomainError),
    /// The server refused the operation.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl<A: CatalogApi> ProductListStore<A> {
    /// Create a book through the API and prepend it to the visible list.
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, ActionError> {
        input.validate()?;

        let response = self.api.create_product(input).await?;
        if !response.status {
            return Err(ActionError::Rejected(message_or(
                response.message,
                GENERIC_SAVE_ERROR,
            )));
        }
        let product = response
            .product
            .ok_or_else(|| ActionError::Rejected(GENERIC_SAVE_ERROR.to_string()))?;

        self.add_product(product.clone()).await;
        Ok(product)
    }

    /// Save edits to a book and merge them into the visible list.
    pub async fn save_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<(), ActionError> {
        if patch.is_empty() {
            return Err(ActionError::Validation(DomainError::validation(
                "nothing to save",
            )));
        }

        let response = self.api.update_product(id, patch).await?;
        if !response.status {
            return Err(ActionError::Rejected(message_or(
                response.message,
                GENERIC_SAVE_ERROR,
            )));
        }

        self.update_product(id, patch).await;
        Ok(())
    }

    /// Fetch the full detail of one book (edit modal).
    pub async fn fetch_product_detail(&self, id: ProductId) -> Result<Product, ActionError> {
        let response = self.api.product_detail(id).await?;
        if !response.status {
            return Err(ActionError::Rejected(message_or(
                response.message,
                NOT_FOUND_ERROR,
            )));
        }
        response
            .product
            .ok_or_else(|| ActionError::Rejected(NOT_FOUND_ERROR.to_string()))
    }

    /// Commit a stock draft and push the new absolute stock into the list.
    pub async fn commit_stock(&self, editor: &mut StockDeltaEditor) -> Result<i64, CommitError> {
        let new_stock = editor.commit(self.api.as_ref()).await?;
        self.update_product(editor.product_id(), &ProductPatch::stock(new_stock))
            .await;
        Ok(new_stock)
    }
}

fn message_or(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
