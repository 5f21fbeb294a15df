//! Shared application state for all routes.

use crate::store::UserStore;
use std::sync::Arc;

/// Built once at startup and handed to the router; dropped at shutdown.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        AppState { store }
    }
}
