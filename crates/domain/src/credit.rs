//! Credit check service trait and implementations.

use std::sync::Arc;

use async_trait::async_trait;
use common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Data sent to the credit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCheckRequest {
    pub customer_name: String,
    pub amount: Money,
}

/// Outcome of a completed credit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDecision {
    Approved,
    Rejected,
}

/// The credit check could not be completed.
#[derive(Debug, Clone, Error)]
#[error("Credit check unavailable: {0}")]
pub struct CreditCheckError(pub String);

/// Trait for store-credit checks.
#[async_trait]
pub trait CreditCheckService: Send + Sync {
    /// Decides whether the customer may pay `request.amount` on credit.
    async fn check(&self, request: &CreditCheckRequest) -> Result<CreditDecision, CreditCheckError>;
}

#[derive(Debug)]
struct InMemoryCreditState {
    decision: CreditDecision,
    fail: bool,
    requests: Vec<CreditCheckRequest>,
}

/// Deterministic credit check for testing.
///
/// Approves by default and records every request it receives.
#[derive(Debug, Clone)]
pub struct InMemoryCreditCheck {
    state: Arc<RwLock<InMemoryCreditState>>,
}

impl Default for InMemoryCreditCheck {
    fn default() -> Self {
        Self::with_decision(CreditDecision::Approved)
    }
}

impl InMemoryCreditCheck {
    /// Creates a credit check that approves every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a credit check that always answers `decision`.
    pub fn with_decision(decision: CreditDecision) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCreditState {
                decision,
                fail: false,
                requests: Vec::new(),
            })),
        }
    }

    /// Changes the answer for subsequent checks.
    pub async fn set_decision(&self, decision: CreditDecision) {
        self.state.write().await.decision = decision;
    }

    /// Configures the service to fail instead of answering.
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Returns the requests received so far.
    pub async fn requests(&self) -> Vec<CreditCheckRequest> {
        self.state.read().await.requests.clone()
    }
}

#[async_trait]
impl CreditCheckService for InMemoryCreditCheck {
    async fn check(&self, request: &CreditCheckRequest) -> Result<CreditDecision, CreditCheckError> {
        let mut state = self.state.write().await;
        if state.fail {
            return Err(CreditCheckError("service offline".to_string()));
        }
        state.requests.push(request.clone());
        Ok(state.decision)
    }
}

/// Simulated credit bureau approving a fixed share of requests at random.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedCreditCheck {
    approval_percent: u8,
}

impl Default for SimulatedCreditCheck {
    fn default() -> Self {
        Self {
            approval_percent: 70,
        }
    }
}

impl SimulatedCreditCheck {
    /// Creates a simulation approving `approval_percent`% of requests
    /// (clamped to 100).
    pub fn new(approval_percent: u8) -> Self {
        Self {
            approval_percent: approval_percent.min(100),
        }
    }

    pub fn approval_percent(&self) -> u8 {
        self.approval_percent
    }
}

#[async_trait]
impl CreditCheckService for SimulatedCreditCheck {
    async fn check(&self, request: &CreditCheckRequest) -> Result<CreditDecision, CreditCheckError> {
        let draw = (Uuid::new_v4().as_u128() % 100) as u8;
        let decision = if draw < self.approval_percent {
            CreditDecision::Approved
        } else {
            CreditDecision::Rejected
        };
        tracing::debug!(customer = %request.customer_name, ?decision, "Simulated credit check");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreditCheckRequest {
        CreditCheckRequest {
            customer_name: "Maria".to_string(),
            amount: Money::from_reais(145),
        }
    }

    #[tokio::test]
    async fn in_memory_records_requests() {
        let service = InMemoryCreditCheck::new();
        let decision = service.check(&request()).await.unwrap();
        assert_eq!(decision, CreditDecision::Approved);
        assert_eq!(service.requests().await, vec![request()]);
    }

    #[tokio::test]
    async fn in_memory_configurable_decision_and_failure() {
        let service = InMemoryCreditCheck::with_decision(CreditDecision::Rejected);
        assert_eq!(
            service.check(&request()).await.unwrap(),
            CreditDecision::Rejected
        );

        service.set_fail(true).await;
        assert!(service.check(&request()).await.is_err());

        service.set_fail(false).await;
        service.set_decision(CreditDecision::Approved).await;
        assert_eq!(
            service.check(&request()).await.unwrap(),
            CreditDecision::Approved
        );
    }

    #[tokio::test]
    async fn simulation_extremes_are_deterministic() {
        let always = SimulatedCreditCheck::new(100);
        let never = SimulatedCreditCheck::new(0);
        for _ in 0..20 {
            assert_eq!(always.check(&request()).await.unwrap(), CreditDecision::Approved);
            assert_eq!(never.check(&request()).await.unwrap(), CreditDecision::Rejected);
        }
    }

    #[test]
    fn simulation_defaults_to_seventy_percent() {
        assert_eq!(SimulatedCreditCheck::default().approval_percent(), 70);
        assert_eq!(SimulatedCreditCheck::new(250).approval_percent(), 100);
    }
}
