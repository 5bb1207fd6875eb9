use serde::{Deserialize, Serialize};

use crate::credit::CreditDecision;
use crate::pricing::PaymentMethod;

/// Progress of the credit check for credit payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CreditCheckStatus {
    #[default]
    NotChecked,
    Checking,
    Approved,
    Rejected,
}

impl CreditCheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditCheckStatus::NotChecked => "not-checked",
            CreditCheckStatus::Checking => "checking",
            CreditCheckStatus::Approved => "approved",
            CreditCheckStatus::Rejected => "rejected",
        }
    }
}

impl From<CreditDecision> for CreditCheckStatus {
    fn from(decision: CreditDecision) -> Self {
        match decision {
            CreditDecision::Approved => CreditCheckStatus::Approved,
            CreditDecision::Rejected => CreditCheckStatus::Rejected,
        }
    }
}

impl std::fmt::Display for CreditCheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The chosen payment method and, for credit, the check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_check: Option<CreditCheckStatus>,
}

impl PaymentSelection {
    /// Creates a selection; credit payments start as not checked.
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            credit_check: method
                .requires_credit_check()
                .then_some(CreditCheckStatus::NotChecked),
        }
    }

    /// Returns true if a credit payment was rejected by the check.
    pub fn is_credit_rejected(&self) -> bool {
        self.credit_check == Some(CreditCheckStatus::Rejected)
    }
}
