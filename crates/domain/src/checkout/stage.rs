//! Checkout stage machine.

use serde::{Deserialize, Serialize};

/// The stage of a checkout session.
///
/// Stage transitions:
/// ```text
/// Address ──► Payment ──► Submitted
///    ▲           │
///    └───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStage {
    /// Collecting the delivery address.
    #[default]
    Address,

    /// Choosing how to pay.
    Payment,

    /// Order placed (terminal state).
    Submitted,
}

impl CheckoutStage {
    /// Returns true if the delivery address can be submitted in this stage.
    pub fn can_submit_address(&self) -> bool {
        matches!(self, CheckoutStage::Address)
    }

    /// Returns true if the session can go back to the address form.
    pub fn can_go_back(&self) -> bool {
        matches!(self, CheckoutStage::Payment)
    }

    /// Returns true if the payment method can be chosen in this stage.
    pub fn can_select_payment(&self) -> bool {
        matches!(self, CheckoutStage::Payment)
    }

    /// Returns true if the order can be confirmed in this stage.
    pub fn can_confirm(&self) -> bool {
        matches!(self, CheckoutStage::Payment)
    }

    /// Returns true if this is a terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStage::Submitted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Address => "address",
            CheckoutStage::Payment => "payment",
            CheckoutStage::Submitted => "submitted",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
