//! Checkout flow: address collection, payment selection and submission.

pub(crate) mod address;
mod confirmation;
mod payment;
mod session;
mod stage;

pub use address::{AddressErrors, AddressField, DeliveryAddress};
pub use confirmation::{OrderConfirmation, OrderNumber, OrderStatus};
pub use payment::{CreditCheckStatus, PaymentSelection};
pub use session::CheckoutSession;
pub use stage::CheckoutStage;

use thiserror::Error;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout cannot start with an empty cart.
    #[error("O carrinho está vazio")]
    EmptyCart,

    /// The delivery address failed validation.
    #[error("Endereço inválido: {0}")]
    InvalidAddress(AddressErrors),

    /// The session is not in a stage that allows the action.
    #[error("Invalid stage transition: cannot {action} from {stage} stage")]
    InvalidStageTransition {
        stage: CheckoutStage,
        action: &'static str,
    },

    /// No payment method has been selected.
    #[error("Selecione uma forma de pagamento")]
    PaymentMethodRequired,

    /// Credit checks only apply to credit payments.
    #[error("A consulta de crédito só se aplica ao crediário")]
    CreditCheckNotApplicable,

    /// The credit check service failed.
    #[error("Credit check failed: {0}")]
    CreditCheck(String),
}
