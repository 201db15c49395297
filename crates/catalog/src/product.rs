use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cuentos_core::{DomainError, DomainResult, ProductId};

/// Storefront availability of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Available,
    Disabled,
}

/// Book product read model (matches the API response shape).
///
/// Owned by the product-list store; presentation code receives clones and
/// mutates nothing in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: ProductId,
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    pub price: f64,
    /// Discount percentage, 0–100.
    #[serde(default)]
    pub discount: f64,
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Available
    }

    /// Effective unit price after the discount percentage.
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.discount / 100.0)
    }

    /// Shallow-merge a patch into this product: only the fields the patch
    /// carries are overwritten.
    pub fn apply_patch(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(author) = &patch.author {
            self.author = Some(author.clone());
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Partial update for a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Patch that only sets the absolute stock value.
    pub fn stock(stock: i64) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// Patch that only sets the storefront status.
    pub fn status(status: ProductStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.discount.is_none()
            && self.stock.is_none()
            && self.status.is_none()
    }
}

/// Input for creating a new book product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    pub stock: i64,
}

impl NewProduct {
    /// Validate the input before it is sent anywhere.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price must be a non-negative number"));
        }
        if !self.discount.is_finite() || !(0.0..=100.0).contains(&self.discount) {
            return Err(DomainError::validation("discount must be between 0 and 100"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(())
    }
}
