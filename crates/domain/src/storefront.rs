//! Application root owning the cart, catalog cache and login session.

use catalog::{CatalogError, ProductId};
use tracing::{info, warn};

use crate::auth::{self, Credentials, SESSION_KEY, UserSession};
use crate::cart::Cart;
use crate::catalog_cache::{CatalogCache, ProductSource};
use crate::checkout::{CheckoutError, CheckoutSession, CreditCheckStatus, OrderConfirmation, OrderNumber};
use crate::credit::CreditCheckService;
use crate::error::DomainError;
use crate::pricing::{PriceBreakdown, PricingEngine};
use crate::service::CartService;
use crate::storage::{ClientStorage, ClientStorageExt, StorageError};

/// Per-customer storefront state.
///
/// Built once at start-up and passed explicitly to whatever drives the UI.
/// Cart and session documents share one [`ClientStorage`].
pub struct Storefront<S: ClientStorage + Clone, C: CreditCheckService> {
    cart: CartService<S>,
    storage: S,
    catalog: CatalogCache,
    user: Option<UserSession>,
    credit: C,
    pricing: PricingEngine,
}

impl<S: ClientStorage + Clone, C: CreditCheckService> Storefront<S, C> {
    /// Restores the cart and login session from storage.
    #[tracing::instrument(skip_all)]
    pub async fn restore(storage: S, credit: C) -> Result<Self, DomainError> {
        let cart = CartService::restore(storage.clone()).await?;
        let user = match storage.load_json::<UserSession>(SESSION_KEY).await {
            Ok(user) => user,
            Err(StorageError::Serialization(e)) => {
                warn!(error = %e, "Stored session is corrupt, starting logged out");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            cart,
            storage,
            catalog: CatalogCache::new(),
            user,
            credit,
            pricing: PricingEngine::default(),
        })
    }

    /// Replaces the pricing rules used for summaries and new checkouts.
    pub fn with_pricing(mut self, pricing: PricingEngine) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserSession::is_admin)
    }

    /// Logs in and persists the session.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&UserSession, DomainError> {
        let session = auth::login(credentials)?;
        self.storage
            .save_json(SESSION_KEY, &session)
            .await
            .map_err(auth::AuthError::from)?;
        info!(email = %session.email, role = %session.role, "User logged in");
        Ok(self.user.insert(session))
    }

    /// Logs out and forgets the persisted session.
    pub async fn logout(&mut self) -> Result<(), DomainError> {
        self.storage
            .remove(SESSION_KEY)
            .await
            .map_err(auth::AuthError::from)?;
        self.user = None;
        Ok(())
    }

    pub fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    pub fn cart_mut(&mut self) -> &mut CartService<S> {
        &mut self.cart
    }

    /// Pre-checkout totals for the cart.
    pub fn cart_summary(&self) -> PriceBreakdown {
        self.pricing.cart_summary(self.cart.cart())
    }

    /// Adds a cached catalog product to the cart.
    pub async fn add_to_cart(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), DomainError> {
        let product = self
            .catalog
            .find(product_id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound(product_id))?;
        self.cart.add_item(&product, quantity, size, color).await?;
        Ok(())
    }

    /// Starts checkout over the current cart. Fails on an empty cart.
    pub fn begin_checkout(&self) -> Result<CheckoutSession, CheckoutError> {
        CheckoutSession::begin_with_pricing(self.cart.cart(), self.pricing)
    }

    /// Runs the credit check for a session using this storefront's service.
    pub async fn run_credit_check(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<CreditCheckStatus, CheckoutError> {
        session.run_credit_check(&self.credit).await
    }

    /// Confirms the session under a fresh order number.
    ///
    /// The checked-out lines leave the cart, and the cart is saved before the
    /// session is confirmed. If that save fails the session stays open and
    /// the cart is unchanged. Items added after `begin_checkout` stay in the cart.
    pub async fn place_order(
        &mut self,
        session: &mut CheckoutSession,
    ) -> Result<OrderConfirmation, DomainError> {
        session.check_confirmable()?;
        self.cart.remove_lines(session.lines()).await?;
        Ok(session.confirm(OrderNumber::generate())?)
    }

    /// Refreshes the product list, keeping the previous one on failure.
    pub async fn refresh_catalog<P: ProductSource + ?Sized>(
        &mut self,
        source: &P,
    ) -> Result<usize, DomainError> {
        Ok(self.catalog.refresh(source).await?)
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }
}
