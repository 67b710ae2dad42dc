//! Server state.

use scriptvault_core::Dispatcher;
use std::sync::Arc;

/// Shared state handed to every route.
pub struct AppState<S> {
    pub dispatcher: Arc<Dispatcher<S>>,
}

impl<S> AppState<S> {
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}
