//! Pricing engine: subtotal, shipping fee, payment discount and total.
//!
//! All arithmetic is done in integer centavos through [`Money`].

use common::Money;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Where the order is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryType {
    InCity,
    OutOfCity,
}

impl DeliveryType {
    /// Returns the wire name (`in-city` / `out-of-city`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::InCity => "in-city",
            DeliveryType::OutOfCity => "out-of-city",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "in-city" => Some(DeliveryType::InCity),
            "out-of-city" => Some(DeliveryType::OutOfCity),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Cash,
    /// Store credit, subject to a credit check.
    Credit,
}

impl PaymentMethod {
    /// Returns true for methods that earn the payment discount.
    pub fn earns_discount(&self) -> bool {
        matches!(self, PaymentMethod::Pix | PaymentMethod::Cash)
    }

    /// Returns true if the method needs a credit check.
    pub fn requires_credit_check(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pix" => Some(PaymentMethod::Pix),
            "cash" => Some(PaymentMethod::Cash),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thresholds and fees used by the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Orders with a subtotal strictly above this ship for free.
    pub free_shipping_above: Money,
    pub in_city_fee: Money,
    pub out_of_city_fee: Money,
    /// Fee shown before the delivery type is known.
    pub fallback_fee: Money,
    /// Discount for [`PaymentMethod::earns_discount`] methods, in percent.
    pub discount_percent: u32,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_above: Money::from_reais(200),
            in_city_fee: Money::from_reais(15),
            out_of_city_fee: Money::from_reais(30),
            fallback_fee: Money::from_reais(20),
            discount_percent: 10,
        }
    }
}

/// Result of pricing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub discount: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// The breakdown of an empty cart.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Pure pricing functions over a set of [`PricingRules`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingEngine {
    rules: PricingRules,
}

impl PricingEngine {
    pub fn new(rules: PricingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Shipping fee for a subtotal. `None` means the delivery type is not
    /// known yet and the fallback fee applies.
    pub fn shipping_fee(&self, subtotal: Money, delivery: Option<DeliveryType>) -> Money {
        if subtotal > self.rules.free_shipping_above {
            return Money::zero();
        }
        match delivery {
            Some(DeliveryType::InCity) => self.rules.in_city_fee,
            Some(DeliveryType::OutOfCity) => self.rules.out_of_city_fee,
            None => self.rules.fallback_fee,
        }
    }

    /// Payment discount on the subtotal. Shipping is never discounted.
    pub fn discount(&self, subtotal: Money, payment: Option<PaymentMethod>) -> Money {
        match payment {
            Some(method) if method.earns_discount() => {
                subtotal.percentage(self.rules.discount_percent)
            }
            _ => Money::zero(),
        }
    }

    /// Prices a subtotal for the given delivery type and payment method.
    pub fn quote(
        &self,
        subtotal: Money,
        delivery: Option<DeliveryType>,
        payment: Option<PaymentMethod>,
    ) -> PriceBreakdown {
        let shipping_fee = self.shipping_fee(subtotal, delivery);
        let discount = self.discount(subtotal, payment);
        let total = subtotal + shipping_fee - discount;

        PriceBreakdown {
            subtotal,
            shipping_fee,
            discount,
            total: if total.is_negative() {
                Money::zero()
            } else {
                total
            },
        }
    }

    /// Prices a cart. An empty cart prices to all zeros.
    pub fn quote_cart(
        &self,
        cart: &Cart,
        delivery: Option<DeliveryType>,
        payment: Option<PaymentMethod>,
    ) -> PriceBreakdown {
        if cart.is_empty() {
            return PriceBreakdown::zero();
        }
        self.quote(cart.subtotal(), delivery, payment)
    }

    /// Pre-checkout summary: fallback shipping fee, no discount.
    pub fn cart_summary(&self, cart: &Cart) -> PriceBreakdown {
        self.quote_cart(cart, None, None)
    }
}
