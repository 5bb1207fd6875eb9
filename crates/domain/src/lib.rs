//! Storefront domain layer.
//!
//! This crate provides the customer-side logic of the store:
//! - Cart aggregate and the persisting cart service
//! - Pricing engine for shipping fees and payment discounts
//! - Checkout state machine with the credit check
//! - Catalog cache, placeholder login and the `Storefront` root

pub mod auth;
pub mod cart;
pub mod catalog_cache;
pub mod checkout;
pub mod credit;
pub mod error;
pub mod pricing;
pub mod service;
pub mod storage;
pub mod storefront;

pub use auth::{AuthError, Credentials, Role, SESSION_KEY, UserSession, login};
pub use cart::{Cart, CartError, CartLine};
pub use catalog_cache::{CatalogCache, ProductSource};
pub use checkout::{
    AddressErrors, AddressField, CheckoutError, CheckoutSession, CheckoutStage,
    CreditCheckStatus, DeliveryAddress, OrderConfirmation, OrderNumber, OrderStatus,
    PaymentSelection,
};
pub use credit::{
    CreditCheckError, CreditCheckRequest, CreditCheckService, CreditDecision,
    InMemoryCreditCheck, SimulatedCreditCheck,
};
pub use error::DomainError;
pub use pricing::{DeliveryType, PaymentMethod, PriceBreakdown, PricingEngine, PricingRules};
pub use service::{CART_KEY, CartService};
pub use storage::{ClientStorage, ClientStorageExt, FileStorage, InMemoryStorage, StorageError};
pub use storefront::Storefront;
