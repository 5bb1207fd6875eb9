//! Currency amounts in Brazilian reais.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money amount represented in centavos to avoid floating point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in centavos (e.g., 1000 = R$ 10,00)
    cents: i64,
}

/// Error returned when a decimal string cannot be read as a money amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid money amount: {input:?}")]
pub struct MoneyParseError {
    pub input: String,
}

impl Money {
    /// Creates a new amount from centavos.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new amount from whole reais.
    pub const fn from_reais(reais: i64) -> Self {
        Self { cents: reais * 100 }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in centavos.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the reais portion (whole number).
    pub fn reais(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the centavos portion (remainder after reais).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, saturating at the `i64` centavo range.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }

    /// Returns `percent`% of this amount, rounded half away from zero to the centavo.
    pub fn percentage(&self, percent: u32) -> Money {
        let scaled = self.cents.saturating_mul(i64::from(percent));
        let rounded = if scaled >= 0 {
            scaled.saturating_add(50) / 100
        } else {
            scaled.saturating_sub(50) / 100
        };
        Money { cents: rounded }
    }

    /// Formats the amount as a plain decimal with two places, e.g. `"1234.56"`.
    ///
    /// This is the wire format the catalog API uses for prices.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        format!("{sign}{}.{:02}", self.reais().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

/// Displays as Brazilian currency, e.g. `R$ 1.234,56`.
impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.reais().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if self.cents < 0 {
            write!(f, "-R$ {},{:02}", grouped, self.cents_part())
        } else {
            write!(f, "R$ {},{:02}", grouped, self.cents_part())
        }
    }
}

/// Parses decimal strings such as `"50"`, `"50.5"`, `"50.00"` or `"50,00"`.
///
/// More than two fractional digits are rejected rather than rounded.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MoneyParseError {
            input: s.to_string(),
        };

        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let normalized = unsigned.replace(',', ".");
        let (whole, fraction) = match normalized.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (normalized.as_str(), ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let reais: i64 = whole.parse().map_err(|_| err())?;
        let cents_part: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };

        let cents = reais
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents_part))
            .ok_or_else(err)?;

        Ok(Money::from_cents(if negative { -cents } else { cents }))
    }
}

// Arithmetic saturates at the i64 centavo range instead of wrapping.

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_sub(rhs.cents);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
