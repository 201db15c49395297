//! Admin smoke shell: wires the client core against a live catalog API.

use cuentos_client::{CatalogClient, ClientConfig, ProductListStore, SnapshotStore};

#[tokio::main]
async fn main() {
    cuentos_observability::init();

    let config = ClientConfig::from_env();

    let api = match &config.auth_token {
        Some(token) => CatalogClient::with_token(config.api_url.clone(), token.clone()),
        None => CatalogClient::new(config.api_url.clone()),
    };

    let snapshots = match config.snapshot_db_path() {
        Some(path) => Some(SnapshotStore::at_path(path)),
        None => match SnapshotStore::open_default() {
            Ok(store) => Some(store),
            Err(err) => {
                tracing::warn!("running without snapshots: {err:?}");
                None
            }
        },
    };

    let store = match snapshots {
        Some(snapshots) => ProductListStore::with_snapshots(api, snapshots),
        None => ProductListStore::new(api),
    };

    store.restore().await;
    let restored = store.state().await;
    if !restored.products.is_empty() {
        tracing::info!(
            products = restored.products.len(),
            page = restored.current_page,
            "restored snapshot"
        );
    }

    let outcome = store.load_products(1, config.page_limit, "").await;
    let state = store.state().await;
    tracing::info!(?outcome, "initial load finished");

    if let Some(error) = &state.error {
        tracing::error!(%error, "catalog unavailable");
        std::process::exit(1);
    }

    tracing::info!(
        total_books = state.total_books,
        available = state.total_available_books,
        disabled = state.total_disabled_books,
        pages = state.total_pages,
        "catalog summary"
    );

    for product in &state.products {
        tracing::info!(
            id = %product.id,
            name = %product.name,
            stock = product.stock,
            price = product.price,
            "product"
        );
    }
}
