//! Shared application state for all routes.

use crate::repository::UserRepository;
use std::sync::Arc;

/// Cloned into every handler. The repository owns the pool; nothing else is shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        AppState { users }
    }
}
