//! Remote catalog API contract and wire types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cuentos_catalog::{NewProduct, Product, ProductPatch};
use cuentos_core::ProductId;

/// Message the API uses when a list query matches nothing.
///
/// Semantically "zero results", not a failure; the store must treat a
/// response carrying it as a valid empty page.
pub const NO_RESULTS_MESSAGE: &str = "No se encontraron productos";

/// One page of the product list, plus catalog-wide counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub status: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_books: u64,
    #[serde(default)]
    pub total_available_books: u64,
    #[serde(default)]
    pub total_disabled_books: u64,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProductPage {
    /// True when the server reported failure but meant "no matches".
    pub fn is_empty_result(&self) -> bool {
        !self.status && self.message.as_deref() == Some(NO_RESULTS_MESSAGE)
    }
}

/// Response carrying a single product (detail, create, edit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailResponse {
    pub status: bool,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a stock update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateResponse {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for a stock update: the signed delta, not the absolute
/// new value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockUpdateRequest {
    pub delta: i64,
}

/// Transport-level failure talking to the catalog API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote product API consumed by the admin screen.
///
/// The store and editors are generic over this trait so tests can script
/// responses without a network.
pub trait CatalogApi {
    async fn list_products(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<ProductPage, ApiError>;

    async fn product_detail(&self, id: ProductId) -> Result<ProductDetailResponse, ApiError>;

    async fn create_product(&self, input: &NewProduct) -> Result<ProductDetailResponse, ApiError>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<ProductDetailResponse, ApiError>;

    async fn update_stock(&self, id: ProductId, delta: i64)
    -> Result<StockUpdateResponse, ApiError>;
}
