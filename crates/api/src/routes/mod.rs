//! HTTP route handlers.

pub mod admin;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod subcategories;
pub mod system;

use std::sync::Arc;

use catalog::CatalogStore;
use domain::PricingEngine;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub pricing: PricingEngine,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            pricing: PricingEngine::default(),
        }
    }
}
