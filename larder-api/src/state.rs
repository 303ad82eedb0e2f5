use std::sync::Arc;

use larder_core::Repository;

/// Shared handler state: the storage backend behind the full contract.
/// Wiring takes any `Repository`, so backends stay interchangeable.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
}
