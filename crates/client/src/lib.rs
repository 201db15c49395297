//! `cuentos-client`
//!
//! **Responsibility:** client core of the children's-books admin dashboard.
//!
//! This crate provides:
//! - The paginated product-list store (single-flight loads, durable snapshot)
//! - The stock-delta editor and its commit flow
//! - The HTTP catalog API client
//!
//! The client is a **thin shell** around the remote catalog API: the
//! presentation layer lives elsewhere and only ever sees cloned state.

pub mod actions;
pub mod api;
pub mod config;
pub mod editor;
pub mod http;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use actions::ActionError;
pub use api::{ApiError, CatalogApi, NO_RESULTS_MESSAGE, ProductPage};
pub use config::ClientConfig;
pub use editor::{CommitError, StockDeltaEditor};
pub use http::CatalogClient;
pub use snapshot::SnapshotStore;
pub use store::{DEFAULT_PAGE_LIMIT, LoadOutcome, ProductListState, ProductListStore};
