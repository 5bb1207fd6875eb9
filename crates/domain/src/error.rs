//! Domain error types.

use catalog::CatalogError;
use thiserror::Error;

use crate::auth::AuthError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::storage::StorageError;

/// Errors surfaced by the storefront root.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
