use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::{DeliveryAddress, PaymentSelection};
use crate::cart::CartLine;
use crate::pricing::PriceBreakdown;

const ORDER_NUMBER_MIN: u32 = 100_000;
const ORDER_NUMBER_SPAN: u128 = 900_000;

/// Customer-facing order number, `ORD-` followed by six digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderNumber(u32);

impl OrderNumber {
    /// Generates a random order number.
    pub fn generate() -> Self {
        Self::from_seed(Uuid::new_v4().as_u128())
    }

    /// Maps any seed onto the 100000–999999 range.
    pub fn from_seed(seed: u128) -> Self {
        Self(ORDER_NUMBER_MIN + (seed % ORDER_NUMBER_SPAN) as u32)
    }

    /// Returns the six-digit numeric part.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Parses `ORD-NNNNNN`.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("ORD-")?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = digits.parse().ok()?;
        (value >= ORDER_NUMBER_MIN).then_some(Self(value))
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ORD-{}", self.0)
    }
}

impl Serialize for OrderNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        OrderNumber::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid order number: {s}")))
    }
}

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet verified by the store.
    #[default]
    AguardandoConfirmacao,
    Confirmado,
    EmSeparacao,
    AguardandoPagamento,
    Enviado,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AguardandoConfirmacao => "aguardando_confirmacao",
            OrderStatus::Confirmado => "confirmado",
            OrderStatus::EmSeparacao => "em_separacao",
            OrderStatus::AguardandoPagamento => "aguardando_pagamento",
            OrderStatus::Enviado => "enviado",
            OrderStatus::Entregue => "entregue",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    /// Returns the label shown to customers.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::AguardandoConfirmacao => "Aguardando confirmação",
            OrderStatus::Confirmado => "Confirmado",
            OrderStatus::EmSeparacao => "Em separação",
            OrderStatus::AguardandoPagamento => "Aguardando pagamento",
            OrderStatus::Enviado => "Enviado",
            OrderStatus::Entregue => "Entregue",
            OrderStatus::Cancelado => "Cancelado",
        }
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Entregue | OrderStatus::Cancelado)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Acknowledgement produced when a checkout session is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub pricing: PriceBreakdown,
    pub lines: Vec<CartLine>,
    pub address: DeliveryAddress,
    pub payment: PaymentSelection,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Returns true if the order was placed on credit after a rejected check.
    pub fn credit_rejected(&self) -> bool {
        self.payment.is_credit_rejected()
    }
}
