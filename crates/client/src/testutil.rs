//! Scripted in-memory API for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use cuentos_catalog::{NewProduct, Product, ProductPatch, ProductStatus};
use cuentos_core::ProductId;

use crate::api::{ApiError, CatalogApi, ProductDetailResponse, ProductPage, StockUpdateResponse};

/// Test double for [`CatalogApi`]: responses are queued per endpoint and
/// popped in order; unscripted calls panic.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    list_delay: Option<Duration>,
    list_responses: Mutex<VecDeque<Result<ProductPage, ApiError>>>,
    detail_responses: Mutex<VecDeque<Result<ProductDetailResponse, ApiError>>>,
    create_responses: Mutex<VecDeque<Result<ProductDetailResponse, ApiError>>>,
    update_responses: Mutex<VecDeque<Result<ProductDetailResponse, ApiError>>>,
    stock_responses: Mutex<VecDeque<Result<StockUpdateResponse, ApiError>>>,
    list_log: Mutex<Vec<(u32, u32, String)>>,
    stock_log: Mutex<Vec<(ProductId, i64)>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Delay every list response, to let tests interleave with an
    /// in-flight fetch.
    pub(crate) fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub(crate) fn push_list(&self, response: Result<ProductPage, ApiError>) {
        self.list_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_detail(&self, response: Result<ProductDetailResponse, ApiError>) {
        self.detail_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_create(&self, response: Result<ProductDetailResponse, ApiError>) {
        self.create_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_update(&self, response: Result<ProductDetailResponse, ApiError>) {
        self.update_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_stock(&self, response: Result<StockUpdateResponse, ApiError>) {
        self.stock_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn list_calls(&self) -> Vec<(u32, u32, String)> {
        self.list_log.lock().unwrap().clone()
    }

    pub(crate) fn stock_calls(&self) -> Vec<(ProductId, i64)> {
        self.stock_log.lock().unwrap().clone()
    }
}

impl CatalogApi for ScriptedApi {
    async fn list_products(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<ProductPage, ApiError> {
        self.list_log
            .lock()
            .unwrap()
            .push((page, limit, search.to_string()));
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.list_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted list response")
    }

    async fn product_detail(&self, _id: ProductId) -> Result<ProductDetailResponse, ApiError> {
        self.detail_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted detail response")
    }

    async fn create_product(&self, _input: &NewProduct) -> Result<ProductDetailResponse, ApiError> {
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted create response")
    }

    async fn update_product(
        &self,
        _id: ProductId,
        _patch: &ProductPatch,
    ) -> Result<ProductDetailResponse, ApiError> {
        self.update_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted update response")
    }

    async fn update_stock(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<StockUpdateResponse, ApiError> {
        self.stock_log.lock().unwrap().push((id, delta));
        self.stock_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted stock response")
    }
}

pub(crate) fn book(name: &str, stock: i64) -> Product {
    Product {
        id: ProductId::new(),
        name: name.to_string(),
        author: None,
        price: 10.0,
        discount: 0.0,
        stock,
        status: ProductStatus::Available,
        updated_at: None,
    }
}

pub(crate) fn ok_page(products: Vec<Product>) -> ProductPage {
    let total = products.len() as u64;
    let available = products.iter().filter(|p| p.is_available()).count() as u64;
    ProductPage {
        status: true,
        total_pages: 1,
        total_books: total,
        total_available_books: available,
        total_disabled_books: total - available,
        message: None,
        products,
    }
}

pub(crate) fn failed_page(message: &str) -> ProductPage {
    ProductPage {
        status: false,
        products: Vec::new(),
        total_pages: 0,
        total_books: 0,
        total_available_books: 0,
        total_disabled_books: 0,
        message: Some(message.to_string()),
    }
}
