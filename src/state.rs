use std::sync::Arc;

use crate::auth::TokenService;
use crate::store::Store;

/// Shared application state: the persistence collaborator and the token
/// service built from startup configuration. Nothing here mutates after
/// process start, so handlers can clone freely.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }
}
