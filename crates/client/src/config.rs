//! Client configuration from the environment.

use std::path::PathBuf;

use crate::store::DEFAULT_PAGE_LIMIT;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Runtime configuration for the admin client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub page_limit: u32,
    /// Overrides the OS app-data directory for the snapshot database.
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Read configuration from `CUENTOS_*` environment variables.
    pub fn from_env() -> Self {
        let api_url = std::env::var("CUENTOS_API_URL").unwrap_or_else(|_| {
            tracing::warn!("CUENTOS_API_URL not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let auth_token = std::env::var("CUENTOS_AUTH_TOKEN").ok();

        let page_limit = std::env::var("CUENTOS_PAGE_LIMIT")
            .ok()
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        let data_dir = std::env::var("CUENTOS_DATA_DIR").ok().map(PathBuf::from);

        Self {
            api_url,
            auth_token,
            page_limit,
            data_dir,
        }
    }

    /// Snapshot database path when `data_dir` is overridden.
    pub fn snapshot_db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("admin.db"))
    }
}
