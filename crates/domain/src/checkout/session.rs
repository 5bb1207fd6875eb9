//! Checkout session aggregate.

use chrono::Utc;
use common::Money;
use tracing::info;

use super::{
    CheckoutError, CheckoutStage, CreditCheckStatus, DeliveryAddress, OrderConfirmation,
    OrderNumber, OrderStatus, PaymentSelection,
};
use crate::cart::{Cart, CartLine};
use crate::credit::{CreditCheckRequest, CreditCheckService};
use crate::pricing::{PaymentMethod, PriceBreakdown, PricingEngine};

/// A multi-step checkout over a snapshot of the cart.
///
/// The session owns a copy of the cart lines taken when checkout began,
/// so later cart edits do not leak into an order being placed.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    lines: Vec<CartLine>,
    subtotal: Money,
    address: Option<DeliveryAddress>,
    payment: Option<PaymentSelection>,
    stage: CheckoutStage,
    confirmation: Option<OrderConfirmation>,
    pricing: PricingEngine,
}

// Query methods
impl CheckoutSession {
    /// Returns the current stage.
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Returns the cart lines being checked out.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the last entered address, valid or not.
    pub fn address(&self) -> Option<&DeliveryAddress> {
        self.address.as_ref()
    }

    pub fn payment(&self) -> Option<&PaymentSelection> {
        self.payment.as_ref()
    }

    /// Returns the confirmation once the session is submitted.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Prices the session with whatever delivery type and payment method
    /// have been chosen so far.
    pub fn pricing(&self) -> PriceBreakdown {
        if self.lines.is_empty() {
            return PriceBreakdown::zero();
        }
        self.pricing.quote(
            self.subtotal,
            self.address.as_ref().map(|a| a.delivery_type),
            self.payment.map(|p| p.method),
        )
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), CheckoutError> {
        if allowed {
            Ok(())
        } else {
            Err(CheckoutError::InvalidStageTransition {
                stage: self.stage,
                action,
            })
        }
    }
}

// Command methods
impl CheckoutSession {
    /// Starts checkout with the default pricing rules.
    pub fn begin(cart: &Cart) -> Result<Self, CheckoutError> {
        Self::begin_with_pricing(cart, PricingEngine::default())
    }

    /// Starts checkout. An empty cart cannot be checked out.
    pub fn begin_with_pricing(cart: &Cart, pricing: PricingEngine) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            lines: cart.lines().to_vec(),
            subtotal: cart.subtotal(),
            address: None,
            payment: None,
            stage: CheckoutStage::Address,
            confirmation: None,
            pricing,
        })
    }

    /// Validates and records the delivery address, moving on to payment.
    ///
    /// On failure the address is kept for correction and the stage does not
    /// change.
    pub fn submit_address(&mut self, address: DeliveryAddress) -> Result<(), CheckoutError> {
        self.ensure(self.stage.can_submit_address(), "submit address")?;

        let result = address.validate();
        self.address = Some(address);
        result.map_err(CheckoutError::InvalidAddress)?;

        self.stage = CheckoutStage::Payment;
        Ok(())
    }

    /// Returns to the address step, keeping everything entered so far.
    pub fn back_to_address(&mut self) -> Result<(), CheckoutError> {
        self.ensure(self.stage.can_go_back(), "go back to address")?;
        self.stage = CheckoutStage::Address;
        Ok(())
    }

    /// Records the payment method. Changing the method discards any
    /// previous credit check outcome.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.ensure(self.stage.can_select_payment(), "select payment")?;

        if self.payment.map(|p| p.method) != Some(method) {
            self.payment = Some(PaymentSelection::new(method));
        }
        Ok(())
    }

    /// Runs the credit check for a credit payment.
    ///
    /// The outcome moves through `checking` to `approved` or `rejected`. If
    /// the service fails the outcome returns to `not-checked`.
    pub async fn run_credit_check(
        &mut self,
        service: &dyn CreditCheckService,
    ) -> Result<CreditCheckStatus, CheckoutError> {
        self.ensure(self.stage.can_select_payment(), "run credit check")?;

        let selection = self.payment.ok_or(CheckoutError::PaymentMethodRequired)?;
        if !selection.method.requires_credit_check() {
            return Err(CheckoutError::CreditCheckNotApplicable);
        }

        let request = CreditCheckRequest {
            customer_name: self
                .address
                .as_ref()
                .map(|a| a.full_name.clone())
                .unwrap_or_default(),
            amount: self.pricing().total,
        };

        self.set_credit_status(CreditCheckStatus::Checking);
        match service.check(&request).await {
            Ok(decision) => {
                let status = CreditCheckStatus::from(decision);
                self.set_credit_status(status);
                Ok(status)
            }
            Err(e) => {
                self.set_credit_status(CreditCheckStatus::NotChecked);
                Err(CheckoutError::CreditCheck(e.to_string()))
            }
        }
    }

    /// Places the order.
    ///
    /// The credit check does not gate confirmation; a rejected outcome is
    /// carried in the confirmation for the store to follow up.
    pub fn confirm(&mut self, order_number: OrderNumber) -> Result<OrderConfirmation, CheckoutError> {
        let (payment, address) = self.confirm_inputs()?;

        let confirmation = OrderConfirmation {
            order_number,
            status: OrderStatus::AguardandoConfirmacao,
            pricing: self.pricing(),
            lines: self.lines.clone(),
            address: address.clone(),
            payment,
            placed_at: Utc::now(),
        };

        self.stage = CheckoutStage::Submitted;
        self.confirmation = Some(confirmation.clone());

        metrics::counter!(
            "checkout_orders_confirmed_total",
            "payment_method" => payment.method.as_str()
        )
        .increment(1);
        info!(
            order_number = %confirmation.order_number,
            total = %confirmation.pricing.total,
            payment_method = %payment.method,
            credit_rejected = confirmation.credit_rejected(),
            "Order confirmed"
        );

        Ok(confirmation)
    }

    /// Fails with the error `confirm` would return, without changing anything.
    pub fn check_confirmable(&self) -> Result<(), CheckoutError> {
        self.confirm_inputs().map(|_| ())
    }

    fn confirm_inputs(&self) -> Result<(PaymentSelection, &DeliveryAddress), CheckoutError> {
        self.ensure(self.stage.can_confirm(), "confirm")?;

        let payment = self.payment.ok_or(CheckoutError::PaymentMethodRequired)?;
        let address = self
            .address
            .as_ref()
            .ok_or(CheckoutError::InvalidStageTransition {
                stage: self.stage,
                action: "confirm",
            })?;
        Ok((payment, address))
    }

    fn set_credit_status(&mut self, status: CreditCheckStatus) {
        if let Some(selection) = self.payment.as_mut() {
            selection.credit_check = Some(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::checkout::AddressField;
    use crate::checkout::address::tests::address;
    use crate::credit::{CreditDecision, InMemoryCreditCheck};
    use crate::pricing::DeliveryType;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 5000, &[]), 2, None, None).unwrap();
        cart.add_item(&product(2, 3000, &[]), 1, None, None).unwrap();
        cart
    }

    fn at_payment(delivery: DeliveryType) -> CheckoutSession {
        let mut session = CheckoutSession::begin(&cart()).unwrap();
        session.submit_address(address(delivery)).unwrap();
        session
    }

    #[test]
    fn empty_cart_cannot_begin() {
        let result = CheckoutSession::begin(&Cart::new());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn valid_address_moves_to_payment() {
        let session = at_payment(DeliveryType::InCity);
        assert_eq!(session.stage(), CheckoutStage::Payment);
        assert_eq!(session.pricing().shipping_fee, Money::from_reais(15));
    }

    #[test]
    fn invalid_address_stays_on_address() {
        let mut session = CheckoutSession::begin(&cart()).unwrap();
        let mut addr = address(DeliveryType::InCity);
        addr.phone = String::new();
        addr.street = String::new();

        let result = session.submit_address(addr);
        match result {
            Err(CheckoutError::InvalidAddress(errors)) => {
                assert_eq!(errors.fields, vec![AddressField::Phone, AddressField::Street]);
            }
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
        assert_eq!(session.stage(), CheckoutStage::Address);
        assert!(session.address().is_some());
    }

    #[test]
    fn back_to_address_keeps_data() {
        let mut session = at_payment(DeliveryType::OutOfCity);
        session.select_payment(PaymentMethod::Pix).unwrap();
        session.back_to_address().unwrap();

        assert_eq!(session.stage(), CheckoutStage::Address);
        assert_eq!(
            session.address().map(|a| a.delivery_type),
            Some(DeliveryType::OutOfCity)
        );
        assert_eq!(session.payment().map(|p| p.method), Some(PaymentMethod::Pix));

        assert!(matches!(
            session.back_to_address(),
            Err(CheckoutError::InvalidStageTransition { .. })
        ));
    }

    #[test]
    fn payment_cannot_be_chosen_before_address() {
        let mut session = CheckoutSession::begin(&cart()).unwrap();
        let result = session.select_payment(PaymentMethod::Cash);
        assert!(matches!(
            result,
            Err(CheckoutError::InvalidStageTransition {
                stage: CheckoutStage::Address,
                ..
            })
        ));
    }

    #[test]
    fn pricing_follows_choices() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Cash).unwrap();
        let quote = session.pricing();
        assert_eq!(quote.discount, Money::from_reais(13));
        assert_eq!(quote.total, Money::from_reais(132));

        session.select_payment(PaymentMethod::Credit).unwrap();
        assert_eq!(session.pricing().total, Money::from_reais(145));
    }

    #[tokio::test]
    async fn credit_check_approves() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Credit).unwrap();

        let service = InMemoryCreditCheck::new();
        let status = session.run_credit_check(&service).await.unwrap();
        assert_eq!(status, CreditCheckStatus::Approved);
        assert_eq!(
            session.payment().and_then(|p| p.credit_check),
            Some(CreditCheckStatus::Approved)
        );

        let requests = service.requests().await;
        assert_eq!(requests[0].amount, Money::from_reais(145));
        assert_eq!(requests[0].customer_name, "Maria Souza");
    }

    #[tokio::test]
    async fn credit_check_only_for_credit() {
        let mut session = at_payment(DeliveryType::InCity);
        let service = InMemoryCreditCheck::new();

        let result = session.run_credit_check(&service).await;
        assert!(matches!(result, Err(CheckoutError::PaymentMethodRequired)));

        session.select_payment(PaymentMethod::Pix).unwrap();
        let result = session.run_credit_check(&service).await;
        assert!(matches!(result, Err(CheckoutError::CreditCheckNotApplicable)));
    }

    #[tokio::test]
    async fn credit_check_failure_resets_outcome() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Credit).unwrap();

        let service = InMemoryCreditCheck::new();
        service.set_fail(true).await;
        let result = session.run_credit_check(&service).await;
        assert!(matches!(result, Err(CheckoutError::CreditCheck(_))));
        assert_eq!(
            session.payment().and_then(|p| p.credit_check),
            Some(CreditCheckStatus::NotChecked)
        );
    }

    #[tokio::test]
    async fn changing_method_resets_credit_outcome() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Credit).unwrap();
        let service = InMemoryCreditCheck::with_decision(CreditDecision::Rejected);
        session.run_credit_check(&service).await.unwrap();

        session.select_payment(PaymentMethod::Credit).unwrap();
        assert_eq!(
            session.payment().and_then(|p| p.credit_check),
            Some(CreditCheckStatus::Rejected)
        );

        session.select_payment(PaymentMethod::Cash).unwrap();
        session.select_payment(PaymentMethod::Credit).unwrap();
        assert_eq!(
            session.payment().and_then(|p| p.credit_check),
            Some(CreditCheckStatus::NotChecked)
        );
    }

    #[test]
    fn confirm_requires_payment_method() {
        let mut session = at_payment(DeliveryType::InCity);
        let result = session.confirm(OrderNumber::from_seed(1));
        assert!(matches!(result, Err(CheckoutError::PaymentMethodRequired)));
        assert_eq!(session.stage(), CheckoutStage::Payment);
    }

    #[test]
    fn check_confirmable_mirrors_confirm_without_side_effects() {
        let mut session = CheckoutSession::begin(&cart()).unwrap();
        assert!(matches!(
            session.check_confirmable(),
            Err(CheckoutError::InvalidStageTransition { .. })
        ));

        session.submit_address(address(DeliveryType::InCity)).unwrap();
        assert!(matches!(
            session.check_confirmable(),
            Err(CheckoutError::PaymentMethodRequired)
        ));

        session.select_payment(PaymentMethod::Pix).unwrap();
        session.check_confirmable().unwrap();
        assert_eq!(session.stage(), CheckoutStage::Payment);
        assert!(session.confirmation().is_none());
    }

    #[test]
    fn confirm_produces_confirmation() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Cash).unwrap();

        let confirmation = session.confirm(OrderNumber::from_seed(23_456)).unwrap();
        assert_eq!(confirmation.order_number.to_string(), "ORD-123456");
        assert_eq!(confirmation.status, OrderStatus::AguardandoConfirmacao);
        assert_eq!(confirmation.pricing.total, Money::from_reais(132));
        assert_eq!(confirmation.lines.len(), 2);
        assert_eq!(session.stage(), CheckoutStage::Submitted);
        assert_eq!(session.confirmation(), Some(&confirmation));
    }

    #[tokio::test]
    async fn rejected_credit_does_not_block_confirmation() {
        let mut session = at_payment(DeliveryType::OutOfCity);
        session.select_payment(PaymentMethod::Credit).unwrap();
        let service = InMemoryCreditCheck::with_decision(CreditDecision::Rejected);
        session.run_credit_check(&service).await.unwrap();

        let confirmation = session.confirm(OrderNumber::generate()).unwrap();
        assert!(confirmation.credit_rejected());
    }

    #[tokio::test]
    async fn submitted_session_rejects_everything() {
        let mut session = at_payment(DeliveryType::InCity);
        session.select_payment(PaymentMethod::Credit).unwrap();
        session.confirm(OrderNumber::from_seed(7)).unwrap();

        let stage_error = |result: Result<(), CheckoutError>| {
            matches!(
                result,
                Err(CheckoutError::InvalidStageTransition {
                    stage: CheckoutStage::Submitted,
                    ..
                })
            )
        };

        assert!(stage_error(session.submit_address(address(DeliveryType::InCity))));
        assert!(stage_error(session.back_to_address()));
        assert!(stage_error(session.select_payment(PaymentMethod::Pix)));
        assert!(stage_error(session.confirm(OrderNumber::from_seed(8)).map(|_| ())));
        assert!(stage_error(
            session
                .run_credit_check(&InMemoryCreditCheck::new())
                .await
                .map(|_| ())
        ));
    }
}
