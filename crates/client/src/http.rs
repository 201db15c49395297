//! HTTP implementation of the catalog API.

use serde::Serialize;
use serde::de::DeserializeOwned;

use cuentos_catalog::{NewProduct, ProductPatch};
use cuentos_core::ProductId;

use crate::api::{
    ApiError, CatalogApi, ProductDetailResponse, ProductPage, StockUpdateRequest,
    StockUpdateResponse,
};

/// `reqwest`-backed client for the remote catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(base_url)
        }
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        self.http.get(&url).send().await.is_ok()
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api(status.as_u16(), body));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(req.json(body)).await
    }
}

impl CatalogApi for CatalogClient {
    async fn list_products(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<ProductPage, ApiError> {
        let url = format!("{}/products", self.base_url);
        let req = self.http.get(&url).query(&[
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("search", search.to_string()),
        ]);
        self.send(req).await
    }

    async fn product_detail(&self, id: ProductId) -> Result<ProductDetailResponse, ApiError> {
        let url = format!("{}/products/{}", self.base_url, id);
        self.send(self.http.get(&url)).await
    }

    async fn create_product(&self, input: &NewProduct) -> Result<ProductDetailResponse, ApiError> {
        let url = format!("{}/products", self.base_url);
        self.send_json(self.http.post(&url), input).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<ProductDetailResponse, ApiError> {
        let url = format!("{}/products/{}", self.base_url, id);
        self.send_json(self.http.put(&url), patch).await
    }

    async fn update_stock(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<StockUpdateResponse, ApiError> {
        let url = format!("{}/products/{}/stock", self.base_url, id);
        self.send_json(self.http.patch(&url), &StockUpdateRequest { delta })
            .await
    }
}
