//! Last-known product list with local filtering.

use std::collections::BTreeSet;

use async_trait::async_trait;
use catalog::{CatalogError, CatalogStore, CatalogStoreExt, Product, ProductId, ProductQuery};
use tracing::{debug, warn};

/// Anything the storefront can fetch the product list from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(&self) -> catalog::Result<Vec<Product>>;
}

#[async_trait]
impl<T: CatalogStore + ?Sized> ProductSource for T {
    async fn fetch_products(&self) -> catalog::Result<Vec<Product>> {
        self.all_products().await
    }
}

/// Holds the last successfully fetched product list.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    products: Vec<Product>,
    last_error: Option<String>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the product list with a fresh fetch.
    ///
    /// On failure the previous list stays in place and the error message is
    /// kept for display until the next successful refresh.
    #[tracing::instrument(skip_all)]
    pub async fn refresh<P: ProductSource + ?Sized>(
        &mut self,
        source: &P,
    ) -> Result<usize, CatalogError> {
        match source.fetch_products().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog refreshed");
                self.products = products;
                self.last_error = None;
                Ok(self.products.len())
            }
            Err(e) => {
                warn!(error = %e, kept = self.products.len(), "Catalog refresh failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Message of the last failed refresh, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Filters, sorts and pages the cached list.
    pub fn filter(&self, query: &ProductQuery) -> Vec<Product> {
        query.apply(self.products.iter().cloned())
    }

    /// Distinct subcategory names, alphabetically.
    pub fn subcategories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.subcategory.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct sizes in the order they first appear.
    pub fn sizes(&self) -> Vec<String> {
        let mut sizes: Vec<String> = Vec::new();
        for size in self.products.iter().flat_map(|p| &p.available_sizes) {
            if !sizes.contains(size) {
                sizes.push(size.clone());
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{InMemoryCatalogStore, ProductSort};
    use common::Money;

    struct FailingSource;

    #[async_trait]
    impl ProductSource for FailingSource {
        async fn fetch_products(&self) -> catalog::Result<Vec<Product>> {
            Err(CatalogError::ProductNotFound(ProductId::new(0)))
        }
    }

    async fn loaded() -> CatalogCache {
        let mut cache = CatalogCache::new();
        cache.refresh(&InMemoryCatalogStore::seeded()).await.unwrap();
        cache
    }

    #[tokio::test]
    async fn refresh_loads_products() {
        let cache = loaded().await;
        assert_eq!(cache.products().len(), 6);
        assert!(cache.last_error().is_none());
        assert_eq!(
            cache.find(ProductId::new(1)).map(|p| p.name.as_str()),
            Some("Camiseta Básica Branca")
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let mut cache = loaded().await;

        let result = cache.refresh(&FailingSource).await;
        assert!(result.is_err());
        assert_eq!(cache.products().len(), 6);
        assert!(cache.last_error().is_some());

        cache.refresh(&InMemoryCatalogStore::seeded()).await.unwrap();
        assert!(cache.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_first_refresh_leaves_cache_empty() {
        let mut cache = CatalogCache::new();
        assert!(cache.refresh(&FailingSource).await.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn filter_options() {
        let cache = loaded().await;
        assert_eq!(
            cache.subcategories(),
            vec!["Calças", "Camisetas", "Tênis", "Vestidos"]
        );

        let sizes = cache.sizes();
        assert!(sizes.contains(&"P".to_string()));
        assert!(sizes.contains(&"42".to_string()));
        let unique: BTreeSet<_> = sizes.iter().collect();
        assert_eq!(unique.len(), sizes.len());
    }

    #[tokio::test]
    async fn local_filtering() {
        let cache = loaded().await;

        let dresses = cache.filter(
            &ProductQuery::new()
                .subcategories(["vestidos"])
                .sort(ProductSort::PriceDesc),
        );
        assert_eq!(dresses.len(), 2);
        assert_eq!(dresses[0].price, Money::from_cents(29990));

        let shoes = cache.filter(&ProductQuery::new().sizes(["40"]));
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].subcategory, "Tênis");
    }
}
