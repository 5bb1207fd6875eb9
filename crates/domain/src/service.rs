//! Cart service persisting the cart after every effective mutation.

use catalog::Product;
use common::{Money, ProductId};
use tracing::{debug, warn};

use crate::cart::{Cart, CartError, CartLine};
use crate::storage::{ClientStorage, ClientStorageExt, StorageError};

/// Storage key holding the cart's line list.
pub const CART_KEY: &str = "cart";

/// Service for managing the shopping cart.
///
/// Wraps a [`Cart`] and a [`ClientStorage`]; the full line list is written
/// back to storage whenever a command changes the cart.
pub struct CartService<S: ClientStorage> {
    cart: Cart,
    storage: S,
}

impl<S: ClientStorage> CartService<S> {
    /// Creates a service with an empty cart.
    pub fn new(storage: S) -> Self {
        Self {
            cart: Cart::new(),
            storage,
        }
    }

    /// Restores the cart persisted under [`CART_KEY`].
    ///
    /// A missing document yields an empty cart. So does a corrupt one,
    /// which is logged and otherwise ignored.
    #[tracing::instrument(skip(storage))]
    pub async fn restore(storage: S) -> Result<Self, StorageError> {
        let cart = match storage.load_json::<Vec<CartLine>>(CART_KEY).await {
            Ok(Some(lines)) => Cart::from_lines(lines),
            Ok(None) => Cart::new(),
            Err(StorageError::Serialization(e)) => {
                warn!(error = %e, "Stored cart is corrupt, starting with an empty cart");
                Cart::new()
            }
            Err(e) => return Err(e),
        };
        debug!(lines = cart.line_count(), "Cart restored");
        Ok(Self { cart, storage })
    }

    /// Returns the current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    /// Adds a product to the cart.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), CartError> {
        self.cart.add_item(product, quantity, size, color)?;
        self.persist("add_item").await
    }

    /// Sets the quantity of a line. Returns true if the cart changed.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<bool, CartError> {
        let changed = self
            .cart
            .update_quantity(product_id, new_quantity, size, color);
        if changed {
            self.persist("update_quantity").await?;
        }
        Ok(changed)
    }

    /// Removes a line. Returns true if the cart changed.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &mut self,
        product_id: ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<bool, CartError> {
        let changed = self.cart.remove_item(product_id, size, color);
        if changed {
            self.persist("remove_item").await?;
        }
        Ok(changed)
    }

    /// Empties the cart. Returns true if the cart changed.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<bool, CartError> {
        let changed = self.cart.clear();
        if changed {
            self.persist("clear").await?;
        }
        Ok(changed)
    }

    /// Takes checked-out lines out of the cart.
    ///
    /// The reduced cart is saved before it replaces the current one, so a
    /// failed save leaves the cart as it was. Returns true if the cart changed.
    #[tracing::instrument(skip_all, fields(lines = checked_out.len()))]
    pub async fn remove_lines(&mut self, checked_out: &[CartLine]) -> Result<bool, CartError> {
        let mut remaining = self.cart.clone();
        if !remaining.remove_lines(checked_out) {
            return Ok(false);
        }
        self.storage.save_json(CART_KEY, remaining.lines()).await?;
        self.cart = remaining;
        metrics::counter!("cart_mutations_total", "operation" => "remove_lines").increment(1);
        Ok(true)
    }

    async fn persist(&self, operation: &'static str) -> Result<(), CartError> {
        self.storage.save_json(CART_KEY, self.cart.lines()).await?;
        metrics::counter!("cart_mutations_total", "operation" => operation).increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::storage::tests::FailingStorage;
    use crate::storage::{FileStorage, InMemoryStorage};

    #[tokio::test]
    async fn mutations_are_persisted() {
        let storage = InMemoryStorage::new();
        let mut service = CartService::new(storage.clone());

        service
            .add_item(&product(1, 5000, &["M"]), 2, Some("M"), None)
            .await
            .unwrap();

        let stored: Vec<CartLine> = storage.load_json(CART_KEY).await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, 2);

        assert!(
            service
                .update_quantity(ProductId::new(1), 5, Some("M"), None)
                .await
                .unwrap()
        );
        let stored: Vec<CartLine> = storage.load_json(CART_KEY).await.unwrap().unwrap();
        assert_eq!(stored[0].quantity, 5);
    }

    #[tokio::test]
    async fn rejected_add_does_not_persist() {
        let storage = InMemoryStorage::new();
        let mut service = CartService::new(storage.clone());

        let result = service.add_item(&product(1, 5000, &[]), 0, None, None).await;
        assert!(matches!(result, Err(CartError::InvalidQuantity { .. })));
        assert!(!storage.contains(CART_KEY).await);
    }

    #[tokio::test]
    async fn no_op_mutations_report_unchanged() {
        let mut service = CartService::new(InMemoryStorage::new());
        service
            .add_item(&product(1, 5000, &[]), 1, None, None)
            .await
            .unwrap();

        assert!(
            !service
                .update_quantity(ProductId::new(1), 0, None, None)
                .await
                .unwrap()
        );
        assert!(
            !service
                .remove_item(ProductId::new(2), None, None)
                .await
                .unwrap()
        );
        assert!(service.clear().await.unwrap());
        assert!(!service.clear().await.unwrap());
    }

    #[tokio::test]
    async fn restore_reads_persisted_cart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut service = CartService::new(FileStorage::new(dir.path()));
            service
                .add_item(&product(1, 5000, &[]), 2, None, None)
                .await
                .unwrap();
            service
                .add_item(&product(2, 3000, &[]), 1, None, None)
                .await
                .unwrap();
        }

        let restored = CartService::restore(FileStorage::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(restored.cart().line_count(), 2);
        assert_eq!(restored.subtotal(), Money::from_reais(130));
    }

    #[tokio::test]
    async fn restore_with_corrupt_document_starts_empty() {
        let storage = InMemoryStorage::new();
        storage
            .save(CART_KEY, "{\"broken\":".to_string())
            .await
            .unwrap();

        let service = CartService::restore(storage).await.unwrap();
        assert!(service.cart().is_empty());
    }

    #[tokio::test]
    async fn restore_without_document_starts_empty() {
        let service = CartService::restore(InMemoryStorage::new()).await.unwrap();
        assert!(service.cart().is_empty());
    }

    #[tokio::test]
    async fn remove_lines_keeps_cart_when_save_fails() {
        let storage = FailingStorage::default();
        let mut service = CartService::new(storage.clone());
        service
            .add_item(&product(1, 5000, &[]), 2, None, None)
            .await
            .unwrap();
        let snapshot = service.cart().lines().to_vec();

        storage.set_failing(true);
        let result = service.remove_lines(&snapshot).await;
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert_eq!(service.cart().total_quantity(), 2);

        storage.set_failing(false);
        assert!(service.remove_lines(&snapshot).await.unwrap());
        assert!(service.cart().is_empty());
        let stored: Vec<CartLine> = storage.load_json(CART_KEY).await.unwrap().unwrap();
        assert!(stored.is_empty());
    }
}
