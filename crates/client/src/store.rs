//! Client state for the paginated, searchable product list.
//!
//! The store is the single source of truth for the admin screen's product
//! list and owns request de-duplication: at most one list fetch is in
//! flight, and a second request inside the debounce window is dropped, not
//! queued. Every accepted load carries a generation token; a response whose
//! token is no longer current is discarded instead of overwriting newer
//! state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use cuentos_catalog::{Product, ProductPatch};
use cuentos_core::ProductId;

use crate::api::CatalogApi;
use crate::snapshot::SnapshotStore;

/// Debounce window for list loads; calls arriving inside it are dropped.
pub(crate) const LOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default page size for the admin grid.
pub const DEFAULT_PAGE_LIMIT: u32 = 8;

/// Snapshot slot holding the persisted subset of the list state.
const SLOT_PRODUCT_LIST: &str = "product_list";

const GENERIC_LOAD_ERROR: &str = "could not load products";

/// Snapshot of the product-list state, cloned out for reads.
///
/// `products` holds the current page only, in server response order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListState {
    pub products: Vec<Product>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u64,
    pub limit: u32,
    pub total_books: u64,
    pub total_available_books: u64,
    pub total_disabled_books: u64,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_initialized: bool,
}

impl Default for ProductListState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_products: 0,
            limit: DEFAULT_PAGE_LIMIT,
            total_books: 0,
            total_available_books: 0,
            total_disabled_books: 0,
            is_loading: false,
            error: None,
            is_initialized: false,
        }
    }
}

/// Subset of the list state that survives process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedList {
    products: Vec<Product>,
    current_page: u32,
    total_pages: u32,
    total_products: u64,
    limit: u32,
}

impl PersistedList {
    fn capture(state: &ProductListState) -> Self {
        Self {
            products: state.products.clone(),
            current_page: state.current_page,
            total_pages: state.total_pages,
            total_products: state.total_products,
            limit: state.limit,
        }
    }

    fn apply(self, state: &mut ProductListState) {
        state.products = self.products;
        state.current_page = self.current_page;
        state.total_pages = self.total_pages;
        state.total_products = self.total_products;
        state.limit = self.limit;
    }
}

/// What happened to a `load_products` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was accepted and the state replaced.
    Applied,
    /// The server or transport rejected the request; the error was recorded
    /// and prior data kept.
    Rejected,
    /// Dropped by the single-flight/debounce guard; no fetch was issued.
    Skipped,
    /// The response arrived for an outdated request token and was discarded.
    Superseded,
}

#[derive(Debug)]
struct Inner {
    state: ProductListState,
    last_load_at: Option<Instant>,
    generation: u64,
}

/// Single source of truth for the paginated product list.
///
/// Cheap to clone; all clones share the same state. The internal lock is
/// never held across a network call: guard checks and state application are
/// two short critical sections around the fetch.
pub struct ProductListStore<A> {
    pub(crate) api: Arc<A>,
    snapshots: Option<SnapshotStore>,
    inner: Arc<Mutex<Inner>>,
}

impl<A> Clone for ProductListStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            snapshots: self.snapshots.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<A: CatalogApi> ProductListStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            snapshots: None,
            inner: Arc::new(Mutex::new(Inner {
                state: ProductListState::default(),
                last_load_at: None,
                generation: 0,
            })),
        }
    }

    /// Store whose persisted subset survives restarts in `snapshots`.
    pub fn with_snapshots(api: A, snapshots: SnapshotStore) -> Self {
        Self {
            snapshots: Some(snapshots),
            ..Self::new(api)
        }
    }

    /// Current state, cloned out. Callers never get a live reference; all
    /// mutations go through the store.
    pub async fn state(&self) -> ProductListState {
        self.inner.lock().await.state.clone()
    }

    /// Hydrate the persisted subset from the snapshot store.
    ///
    /// Ephemeral flags start over regardless of what was persisted:
    /// `is_loading`, `error` and `is_initialized` are reset, and any fetch
    /// still in flight is invalidated.
    pub async fn restore(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.state.is_loading = false;
            inner.state.error = None;
            inner.state.is_initialized = false;
        }

        let Some(snapshots) = &self.snapshots else {
            return;
        };

        match snapshots.load::<PersistedList>(SLOT_PRODUCT_LIST).await {
            Ok(Some(persisted)) => {
                let mut inner = self.inner.lock().await;
                persisted.apply(&mut inner.state);
                tracing::debug!(
                    products = inner.state.products.len(),
                    page = inner.state.current_page,
                    "restored product list snapshot"
                );
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("failed to restore product list snapshot: {err:?}");
            }
        }
    }

    /// Load one page of the product list.
    ///
    /// No-op when a load is already in flight or one was accepted less than
    /// the debounce window ago. On success the whole visible state is
    /// replaced; on rejection the previous products stay visible and only
    /// `error` changes.
    pub async fn load_products(&self, page: u32, limit: u32, search: &str) -> LoadOutcome {
        let page = page.max(1);
        let limit = limit.max(1);

        let token = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_loading {
                tracing::debug!(page, "list load dropped: request already in flight");
                return LoadOutcome::Skipped;
            }
            if let Some(last) = inner.last_load_at {
                if last.elapsed() < LOAD_DEBOUNCE {
                    tracing::debug!(page, "list load dropped: inside debounce window");
                    return LoadOutcome::Skipped;
                }
            }
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.last_load_at = Some(Instant::now());
            inner.generation += 1;
            inner.generation
        };

        let result = self.api.list_products(page, limit, search).await;

        let persisted = {
            let mut inner = self.inner.lock().await;
            if inner.generation != token {
                tracing::warn!(page, "discarding stale list response superseded by a newer load");
                return LoadOutcome::Superseded;
            }
            inner.state.is_loading = false;

            match result {
                Ok(response) if response.status => {
                    inner.state.products = response.products;
                    inner.state.current_page = page;
                    inner.state.total_pages = response.total_pages;
                    inner.state.total_products = response.total_books;
                    inner.state.limit = limit;
                    inner.state.total_books = response.total_books;
                    inner.state.total_available_books = response.total_available_books;
                    inner.state.total_disabled_books = response.total_disabled_books;
                    inner.state.is_initialized = true;
                    Some(PersistedList::capture(&inner.state))
                }
                Ok(response) if response.is_empty_result() => {
                    inner.state.products.clear();
                    inner.state.current_page = 1;
                    inner.state.total_pages = 0;
                    inner.state.total_products = 0;
                    inner.state.limit = limit;
                    inner.state.total_books = 0;
                    inner.state.total_available_books = 0;
                    inner.state.total_disabled_books = 0;
                    inner.state.is_initialized = true;
                    Some(PersistedList::capture(&inner.state))
                }
                Ok(response) => {
                    let message = message_or_generic(response.message, GENERIC_LOAD_ERROR);
                    tracing::warn!(%message, "list load rejected by the server");
                    inner.state.error = Some(message);
                    None
                }
                Err(err) => {
                    tracing::warn!(error = %err, "list load failed");
                    inner.state.error = Some(message_or_generic(
                        Some(err.to_string()),
                        GENERIC_LOAD_ERROR,
                    ));
                    None
                }
            }
        };

        match persisted {
            Some(snapshot) => {
                self.persist(snapshot).await;
                LoadOutcome::Applied
            }
            None => LoadOutcome::Rejected,
        }
    }

    /// Reload the page the store is currently on.
    pub async fn refresh_products(&self, search: &str) -> LoadOutcome {
        let (page, limit) = {
            let inner = self.inner.lock().await;
            (inner.state.current_page, inner.state.limit)
        };
        self.load_products(page, limit, search).await
    }

    pub async fn go_to_page(&self, page: u32, search: &str) -> LoadOutcome {
        let limit = self.inner.lock().await.state.limit;
        self.load_products(page, limit, search).await
    }

    /// Page-size changes always restart from the first page.
    pub async fn change_limit(&self, new_limit: u32, search: &str) -> LoadOutcome {
        self.load_products(1, new_limit, search).await
    }

    /// Prepend a product to the visible list (local only; pagination
    /// counters are not renumbered).
    pub async fn add_product(&self, product: Product) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.state.products.insert(0, product);
            PersistedList::capture(&inner.state)
        };
        self.persist(snapshot).await;
    }

    /// Shallow-merge `patch` into the matching product. Returns `false`
    /// (and changes nothing) when the id is not on the current page.
    pub async fn update_product(&self, id: ProductId, patch: &ProductPatch) -> bool {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let Some(product) = inner.state.products.iter_mut().find(|p| p.id == id) else {
                return false;
            };
            product.apply_patch(patch);
            PersistedList::capture(&inner.state)
        };
        self.persist(snapshot).await;
        true
    }

    /// Drop the matching product from the visible list. Returns `false`
    /// when the id is not on the current page.
    pub async fn remove_product(&self, id: ProductId) -> bool {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let before = inner.state.products.len();
            inner.state.products.retain(|p| p.id != id);
            if inner.state.products.len() == before {
                return false;
            }
            PersistedList::capture(&inner.state)
        };
        self.persist(snapshot).await;
        true
    }

    async fn persist(&self, snapshot: PersistedList) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };
        if let Err(err) = snapshots.save(SLOT_PRODUCT_LIST, &snapshot).await {
            tracing::warn!("failed to persist product list snapshot: {err:?}");
        }
    }
}

fn message_or_generic(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NO_RESULTS_MESSAGE;
    use crate::testutil::{ScriptedApi, book, failed_page, ok_page};

    #[tokio::test]
    async fn load_replaces_state_on_success() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5), book("Momo", 2)])));
        let store = ProductListStore::new(api);

        let outcome = store.load_products(1, 8, "").await;
        assert_eq!(outcome, LoadOutcome::Applied);

        let state = store.state().await;
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.limit, 8);
        assert_eq!(state.total_books, 2);
        assert_eq!(state.total_products, 2);
        assert!(state.is_initialized);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn second_load_inside_debounce_window_is_dropped() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);

        assert_eq!(store.load_products(1, 8, "").await, LoadOutcome::Applied);
        assert_eq!(store.load_products(2, 8, "").await, LoadOutcome::Skipped);

        assert_eq!(store.api.list_calls().len(), 1);
        assert_eq!(store.state().await.current_page, 1);
    }

    #[tokio::test]
    async fn concurrent_loads_are_single_flight() {
        let api = ScriptedApi::new().with_list_delay(Duration::from_millis(50));
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);

        let (first, second) = tokio::join!(
            store.load_products(1, 8, ""),
            store.load_products(2, 8, ""),
        );

        assert_eq!(first, LoadOutcome::Applied);
        assert_eq!(second, LoadOutcome::Skipped);
        assert_eq!(store.api.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn loads_spaced_beyond_debounce_both_fetch() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Ok(ok_page(vec![book("Momo", 2)])));
        let store = ProductListStore::new(api);

        assert_eq!(store.load_products(1, 8, "").await, LoadOutcome::Applied);
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        assert_eq!(store.load_products(2, 8, "").await, LoadOutcome::Applied);

        assert_eq!(store.api.list_calls().len(), 2);
        assert_eq!(store.state().await.current_page, 2);
    }

    #[tokio::test]
    async fn no_results_sentinel_is_a_valid_empty_result() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Ok(failed_page(NO_RESULTS_MESSAGE)));
        let store = ProductListStore::new(api);

        store.load_products(1, 8, "").await;
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        let outcome = store.load_products(1, 8, "tolkien").await;

        assert_eq!(outcome, LoadOutcome::Applied);
        let state = store.state().await;
        assert!(state.products.is_empty());
        assert!(state.error.is_none());
        assert!(state.is_initialized);
        assert_eq!(state.total_books, 0);
        assert_eq!(state.total_pages, 0);
    }

    #[tokio::test]
    async fn server_rejection_keeps_previous_products() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Ok(failed_page("database timeout")));
        let store = ProductListStore::new(api);

        store.load_products(1, 8, "").await;
        let before = store.state().await;
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        let outcome = store.load_products(2, 8, "").await;

        assert_eq!(outcome, LoadOutcome::Rejected);
        let state = store.state().await;
        assert_eq!(state.products, before.products);
        assert_eq!(state.current_page, before.current_page);
        assert_eq!(state.error.as_deref(), Some("database timeout"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_products() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Err(crate::api::ApiError::Network(
            "connection refused".to_string(),
        )));
        let store = ProductListStore::new(api);

        store.load_products(1, 8, "").await;
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        let outcome = store.load_products(2, 8, "").await;

        assert_eq!(outcome, LoadOutcome::Rejected);
        let state = store.state().await;
        assert_eq!(state.products.len(), 1);
        assert_eq!(
            state.error.as_deref(),
            Some("network error: connection refused")
        );
    }

    #[tokio::test]
    async fn change_limit_always_resets_to_first_page() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Ok(ok_page(vec![book("Momo", 2)])));
        let store = ProductListStore::new(api);

        store.load_products(3, 8, "").await;
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        assert_eq!(store.change_limit(16, "").await, LoadOutcome::Applied);

        let calls = store.api.list_calls();
        assert_eq!(calls[1], (1, 16, String::new()));
        assert_eq!(store.state().await.current_page, 1);
        assert_eq!(store.state().await.limit, 16);
    }

    #[tokio::test]
    async fn refresh_reuses_current_page_and_limit() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);

        store.load_products(4, 12, "").await;
        tokio::time::sleep(LOAD_DEBOUNCE + Duration::from_millis(20)).await;
        store.refresh_products("roald").await;

        let calls = store.api.list_calls();
        assert_eq!(calls[1], (4, 12, "roald".to_string()));
    }

    #[tokio::test]
    async fn update_product_patches_only_the_matching_product() {
        let api = ScriptedApi::new();
        let matilda = book("Matilda", 5);
        let momo = book("Momo", 2);
        let momo_id = momo.id;
        api.push_list(Ok(ok_page(vec![matilda.clone(), momo])));
        let store = ProductListStore::new(api);
        store.load_products(1, 8, "").await;

        assert!(store.update_product(momo_id, &ProductPatch::stock(7)).await);

        let state = store.state().await;
        let patched = state.products.iter().find(|p| p.id == momo_id).unwrap();
        assert_eq!(patched.stock, 7);
        assert_eq!(patched.name, "Momo");

        let untouched = state.products.iter().find(|p| p.id == matilda.id).unwrap();
        assert_eq!(untouched.stock, 5);
        assert_eq!(untouched.name, "Matilda");
    }

    #[tokio::test]
    async fn update_product_with_unknown_id_is_a_noop() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);
        store.load_products(1, 8, "").await;
        let before = store.state().await;

        assert!(!store.update_product(ProductId::new(), &ProductPatch::stock(7)).await);
        assert_eq!(store.state().await.products, before.products);
    }

    #[tokio::test]
    async fn add_and_remove_product_are_local_only() {
        let api = ScriptedApi::new();
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);
        store.load_products(1, 8, "").await;

        let new_book = book("El Principito", 9);
        let new_id = new_book.id;
        store.add_product(new_book).await;

        let state = store.state().await;
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.products[0].id, new_id);

        assert!(store.remove_product(new_id).await);
        assert!(!store.remove_product(new_id).await);
        assert_eq!(store.state().await.products.len(), 1);

        // Local mutations never hit the API.
        assert_eq!(store.api.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn restore_invalidates_an_in_flight_load() {
        let api = ScriptedApi::new().with_list_delay(Duration::from_millis(50));
        api.push_list(Ok(ok_page(vec![book("Matilda", 5)])));
        let store = ProductListStore::new(api);

        let (outcome, ()) = tokio::join!(store.load_products(1, 8, ""), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.restore().await;
        });

        assert_eq!(outcome, LoadOutcome::Superseded);
        let state = store.state().await;
        assert!(state.products.is_empty());
        assert!(!state.is_loading);
        assert!(!state.is_initialized);
    }
}
