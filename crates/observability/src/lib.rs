//! Tracing and logging (shared setup).

/// Initialize process-wide observability with human-readable output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide observability with JSON output, for when the
/// client logs are shipped somewhere structured.
pub fn init_json() {
    tracing::init_json();
}

/// Tracing configuration (filters, formats).
pub mod tracing;
